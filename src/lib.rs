pub mod config;
pub mod contact;
pub mod cors;
pub mod db;
pub mod email;
pub mod error;
pub mod function;
pub mod models;
pub mod routes;
pub mod state;
pub mod telemetry;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Config, SmtpConfig};
use crate::contact::ContactService;
use crate::cors::CorsPolicy;
use crate::db::{DisabledStore, PgSubmissionStore, SubmissionStore};
use crate::email::{Notifier, SmtpNotifier, WithTimeout};
use crate::error::SendError;
use crate::state::{AppState, SharedState};

pub type SmtpSender = WithTimeout<SmtpNotifier>;

pub fn build_store(config: &Config) -> Arc<dyn SubmissionStore> {
    match &config.database {
        Some(db) => Arc::new(PgSubmissionStore::new(db.clone())),
        None => {
            tracing::warn!("DATABASE_URL not set, submissions will only be emailed");
            Arc::new(DisabledStore)
        }
    }
}

pub fn build_notifier(config: &SmtpConfig) -> Result<Arc<SmtpSender>, SendError> {
    let notifier = SmtpNotifier::new(config)?;
    Ok(Arc::new(WithTimeout::new(notifier, config.timeout)))
}

/// Contact service wired to the real store and SMTP sender.
pub fn build_contact_service(config: &Config) -> Result<ContactService, SendError> {
    Ok(ContactService::new(
        build_store(config),
        build_notifier(&config.smtp)?,
        CorsPolicy::new(&config.allowed_origins),
    ))
}

/// Probe the SMTP server in the background and log the result.
pub fn spawn_smtp_check(sender: Arc<SmtpSender>) {
    tokio::spawn(async move {
        match sender.inner().check_connection().await {
            Ok(true) => tracing::info!("SMTP server is ready to take messages"),
            Ok(false) => tracing::warn!("SMTP server did not accept the connection test"),
            Err(e) => tracing::warn!("SMTP connection test failed: {e}"),
        }
    });
}

pub fn build_app(
    config: &Config,
    store: Arc<dyn SubmissionStore>,
    notifier: Arc<dyn Notifier>,
) -> Router {
    let contact = ContactService::new(store, notifier, CorsPolicy::new(&config.allowed_origins));
    let state: SharedState = Arc::new(AppState { contact });

    Router::new()
        .merge(routes::api_routes())
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}
