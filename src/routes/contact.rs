use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::header::{CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderMap, HeaderName, Method};

use crate::contact::{ContactRequest, ContactResponse};
use crate::state::SharedState;

pub async fn submit(
    State(state): State<SharedState>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ContactResponse {
    let body = match body {
        Ok(bytes) => String::from_utf8(bytes.to_vec()).ok(),
        Err(e) => {
            tracing::debug!("Could not read contact body: {e}");
            None
        }
    };

    state
        .contact
        .handle(canonical_request(method, &headers, body))
        .await
}

pub fn canonical_request(method: Method, headers: &HeaderMap, body: Option<String>) -> ContactRequest {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    ContactRequest {
        method,
        origin: header(ORIGIN),
        content_type: header(CONTENT_TYPE),
        body,
    }
}
