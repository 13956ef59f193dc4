#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use checkout_types::{
    proto::suggestions::{
        suggestions_server::Suggestions as SuggestionsRpc, Book, GetSuggestionsRequest,
        GetSuggestionsResponse,
    },
    IntoProto, VectorClock,
};
use once_cell::sync::Lazy;
use tonic::{Request, Response, Status};
use tracing::debug;

const SERVICE_ID: &str = "suggestions";

/// Built-in recommendation catalogue (`SPEC_FULL.md` §6). Unknown titles
/// contribute no suggestions.
static CATALOGUE: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        ("Book A", ["Book C", "Book D"].as_slice()),
        ("Book B", ["Book E", "Book F"].as_slice()),
        ("Book K", ["Book G", "Book H"].as_slice()),
        ("Book L", ["Book I", "Book J"].as_slice()),
    ])
});

/// Looks up the deduplicated union of suggestions for a set of purchased
/// titles.
fn suggestions_for(purchased_books: &[String]) -> HashSet<&'static str> {
    purchased_books
        .iter()
        .flat_map(|book| CATALOGUE.get(book.as_str()).copied().unwrap_or_default())
        .copied()
        .collect()
}

/// Stateless except for a per-order vector-clock counter, which only exists
/// to mirror the source's own "increment VC per call, keyed by order id"
/// behavior (`SPEC_FULL.md` §4.4).
#[derive(Default)]
pub struct SuggestionsService {
    vector_clocks: Mutex<HashMap<String, VectorClock>>,
}

impl SuggestionsService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[tonic::async_trait]
impl SuggestionsRpc for SuggestionsService {
    async fn get_suggestions(
        &self,
        request: Request<GetSuggestionsRequest>,
    ) -> Result<Response<GetSuggestionsResponse>, Status> {
        let request = request.into_inner();
        let order_key = if request.order_id.is_empty() {
            "unknown".to_owned()
        } else {
            request.order_id
        };

        let vector_clock = {
            let mut vector_clocks = self.vector_clocks.lock().unwrap();
            let vc = vector_clocks.entry(order_key.clone()).or_default();
            vc.increment(SERVICE_ID);
            vc.clone()
        };

        let suggested_books = suggestions_for(&request.purchased_books)
            .into_iter()
            .map(|title| Book {
                title: title.to_owned(),
            })
            .collect::<Vec<_>>();

        debug!(order_id = %order_key, ?vector_clock, count = suggested_books.len(), "GetSuggestions");
        Ok(Response::new(GetSuggestionsResponse {
            suggested_books,
            vector_clock: Some(vector_clock.into_proto()),
        }))
    }
}
