use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use anyhow::{Context as _, Result as AnyResult};
use hyper::{
    body::Buf as _,
    header,
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use serde::Serialize;
use tracing::info;

use crate::{app::App, domain::OrderRequest, error::Error};

const CONTENT_JSON: &str = "application/json";

#[derive(Serialize)]
struct SuggestedBook {
    title: String,
}

#[derive(Serialize)]
struct CheckoutSuccess {
    #[serde(rename = "orderId")]
    order_id: String,
    status: &'static str,
    #[serde(rename = "suggestedBooks")]
    suggested_books: Vec<SuggestedBook>,
}

/// Parses the request body as JSON and hands it to `checkout`
/// (`SPEC_FULL.md` §6: content-type `application/json`, `POST` only).
async fn handle_checkout(app: &App, request: Request<Body>) -> Result<Response<Body>, Error> {
    if request.method() != Method::POST {
        return Err(Error::InvalidMethod);
    }
    let valid_content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .map_or(false, |content_type| content_type == CONTENT_JSON);
    if !valid_content_type {
        return Err(Error::InvalidContentType);
    }

    let body = hyper::body::aggregate(request).await?;
    let order: OrderRequest = serde_json::from_reader(body.reader())?;

    let result = app.checkout(order).await?;
    let body = CheckoutSuccess {
        order_id: result.order_id,
        status: "Order Approved",
        suggested_books: result.suggested_books.into_iter().map(|title| SuggestedBook { title }).collect(),
    };
    let json = serde_json::to_string(&body).unwrap_or_default();
    let mut response = Response::new(Body::from(json));
    response.headers_mut().insert(header::CONTENT_TYPE, header::HeaderValue::from_static(CONTENT_JSON));
    *response.status_mut() = StatusCode::OK;
    Ok(response)
}

async fn route(app: Arc<App>, request: Request<Body>) -> Result<Response<Body>, Infallible> {
    let response = match request.uri().path() {
        "/checkout" => handle_checkout(&app, request).await,
        _ => Err(Error::NotFound),
    };
    Ok(response.unwrap_or_else(Error::into_response))
}

/// Runs the orchestrator's HTTP server on `socket_address` until the
/// process is killed.
pub async fn serve(app: App, socket_address: &SocketAddr) -> AnyResult<()> {
    let app = Arc::new(app);
    let service = make_service_fn(move |_connection| {
        let app = Arc::clone(&app);
        async move { Ok::<_, Infallible>(service_fn(move |request| route(Arc::clone(&app), request))) }
    });

    let listener = Server::try_bind(socket_address)
        .with_context(|| format!("error binding {socket_address} for the orchestrator server"))?;
    info!("Listening on http://{socket_address}");
    listener.serve(service).await.context("internal server error in the orchestrator")?;
    Ok(())
}
