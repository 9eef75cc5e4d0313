pub mod contact;
pub mod health;

use axum::Router;
use axum::routing::any;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/contact", any(contact::submit))
        .route("/api/health", any(health::health))
        .route("/health", any(health::health))
}
