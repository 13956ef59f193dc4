use hyper::{header, header::HeaderValue, Body, Response, StatusCode};
use serde_json::json;
use thiserror::Error;

const CONTENT_JSON: &str = "application/json";

/// Everything that can make `/checkout` answer with something other than
/// 200 (`SPEC_FULL.md` §4.1, §7).
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid http method, expected POST")]
    InvalidMethod,
    #[error("not found")]
    NotFound,
    #[error("invalid content type, expecting \"application/json\"")]
    InvalidContentType,
    #[error("invalid json body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("error reading request body")]
    Http(#[from] hyper::Error),
    #[error("Missing order_id in request")]
    MissingOrderId,
    #[error("{0}")]
    Rejected(String),
    #[error("enqueue failed")]
    EnqueueFailed,
}

impl Error {
    #[must_use]
    pub fn into_response(self) -> Response<Body> {
        let (status, body) = match self {
            Self::InvalidMethod => (StatusCode::METHOD_NOT_ALLOWED, json!({"error": "method not allowed"})),
            Self::NotFound => (StatusCode::NOT_FOUND, json!({"error": "not found"})),
            Self::InvalidContentType => {
                (StatusCode::BAD_REQUEST, json!({"error": "expected application/json"}))
            }
            Self::Json(error) => {
                (StatusCode::BAD_REQUEST, json!({"error": format!("invalid json: {error}")}))
            }
            Self::Http(error) => {
                (StatusCode::BAD_REQUEST, json!({"error": format!("error reading body: {error}")}))
            }
            Self::MissingOrderId => {
                (StatusCode::BAD_REQUEST, json!({"error": "Missing order_id in request"}))
            }
            Self::Rejected(reason) => {
                (StatusCode::BAD_REQUEST, json!({"status": "rejected", "reason": reason}))
            }
            Self::EnqueueFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({"status": "rejected", "reason": "Failed to enqueue order"}))
            }
        };
        let mut response = Response::new(Body::from(body.to_string()));
        response.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_JSON));
        *response.status_mut() = status;
        response
    }
}
