#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    sync::{
        atomic::{AtomicU64, Ordering as AtomicOrdering},
        Mutex,
    },
};

use checkout_types::proto::queue::{
    order_queue_server::OrderQueue as OrderQueueRpc, DequeueResponse, EnqueueRequest,
    EnqueueResponse,
};
use tonic::{Request, Response, Status};
use tracing::debug;

const PREMIUM_BONUS: f64 = 5.0;

/// Priority score: `amount + itemCount + premium_bonus` (`SPEC_FULL.md` §3).
fn priority_score(amount: f64, item_count: u32, user_type: &str) -> f64 {
    let bonus = if user_type == "premium" {
        PREMIUM_BONUS
    } else {
        0.0
    };
    amount + f64::from(item_count) + bonus
}

#[derive(Debug, Clone)]
struct Entry {
    priority_score: f64,
    // A monotonic enqueue sequence number stands in for wall-clock enqueue
    // timestamp: it is strictly increasing, free of clock-skew/resolution
    // ties, and preserves the same "earlier enqueue wins" tie-break.
    sequence: u64,
    order_id: String,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority_score
            .partial_cmp(&other.priority_score)
            .unwrap_or(Ordering::Equal)
            // Reversed: a smaller sequence number (earlier enqueue) must sort
            // as "greater" so `BinaryHeap`'s max-heap pops it first.
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// A single in-memory ordered multiset of accepted orders, serialized under
/// one mutex (`SPEC_FULL.md` §4.5).
pub struct OrderQueueService {
    heap: Mutex<BinaryHeap<Entry>>,
    next_sequence: AtomicU64,
}

impl Default for OrderQueueService {
    fn default() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            next_sequence: AtomicU64::new(0),
        }
    }
}

impl OrderQueueService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[tonic::async_trait]
impl OrderQueueRpc for OrderQueueService {
    async fn enqueue(
        &self,
        request: Request<EnqueueRequest>,
    ) -> Result<Response<EnqueueResponse>, Status> {
        let request = request.into_inner();
        let score = priority_score(request.amount, request.item_count, &request.user_type);
        let sequence = self.next_sequence.fetch_add(1, AtomicOrdering::SeqCst);
        let entry = Entry {
            priority_score: score,
            sequence,
            order_id: request.order_id.clone(),
        };
        self.heap.lock().unwrap().push(entry);
        debug!(order_id = %request.order_id, score, "Enqueued order");
        Ok(Response::new(EnqueueResponse { success: true }))
    }

    async fn dequeue(
        &self,
        _request: Request<checkout_types::proto::common::Empty>,
    ) -> Result<Response<DequeueResponse>, Status> {
        let popped = self.heap.lock().unwrap().pop();
        let order_id = popped.map_or_else(String::new, |entry| entry.order_id);
        if order_id.is_empty() {
            debug!("Queue empty");
        } else {
            debug!(%order_id, "Dequeued order");
        }
        Ok(Response::new(DequeueResponse { order_id }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn enqueue(service: &OrderQueueService, order_id: &str, amount: f64, items: u32, user_type: &str) {
        service
            .enqueue(Request::new(EnqueueRequest {
                order_id: order_id.into(),
                amount,
                item_count: items,
                user_type: user_type.into(),
            }))
            .await
            .unwrap();
    }

    async fn dequeue(service: &OrderQueueService) -> String {
        service
            .dequeue(Request::new(checkout_types::proto::common::Empty {}))
            .await
            .unwrap()
            .into_inner()
            .order_id
    }

    #[tokio::test]
    async fn dequeue_on_empty_queue_returns_empty_id() {
        let service = OrderQueueService::new();
        assert_eq!(dequeue(&service).await, "");
    }

    #[tokio::test]
    async fn dequeues_in_priority_order_from_the_spec_scenario() {
        let service = OrderQueueService::new();
        // scores: 16, 22, 11
        enqueue(&service, "premium-order", 10.0, 1, "premium").await;
        enqueue(&service, "big-order", 20.0, 2, "regular").await;
        enqueue(&service, "small-order", 10.0, 1, "regular").await;

        assert_eq!(dequeue(&service).await, "big-order");
        assert_eq!(dequeue(&service).await, "premium-order");
        assert_eq!(dequeue(&service).await, "small-order");
        assert_eq!(dequeue(&service).await, "");
    }

    #[tokio::test]
    async fn ties_break_by_earlier_enqueue() {
        let service = OrderQueueService::new();
        enqueue(&service, "first", 10.0, 0, "regular").await;
        enqueue(&service, "second", 10.0, 0, "regular").await;
        assert_eq!(dequeue(&service).await, "first");
        assert_eq!(dequeue(&service).await, "second");
    }

    proptest::proptest! {
        #[test]
        fn dequeue_order_is_non_increasing_by_score(
            amounts in proptest::collection::vec(0f64..100.0, 1..20)
        ) {
            let service = OrderQueueService::new();
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                for (i, amount) in amounts.iter().enumerate() {
                    enqueue(&service, &format!("order-{i}"), *amount, 0, "regular").await;
                }
                let mut previous = f64::INFINITY;
                loop {
                    let id = dequeue(&service).await;
                    if id.is_empty() {
                        break;
                    }
                    let index: usize = id.strip_prefix("order-").unwrap().parse().unwrap();
                    let score = amounts[index];
                    assert!(score <= previous);
                    previous = score;
                }
            });
        }
    }
}
