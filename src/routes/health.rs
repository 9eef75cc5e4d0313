use axum::extract::State;
use axum::http::{HeaderMap, Method};

use super::contact::canonical_request;
use crate::contact::ContactResponse;
use crate::state::SharedState;

pub async fn health(
    State(state): State<SharedState>,
    method: Method,
    headers: HeaderMap,
) -> ContactResponse {
    state.contact.health(&canonical_request(method, &headers, None))
}
