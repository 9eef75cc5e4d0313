pub mod parser;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;
use serde_json::json;

use crate::cors::CorsPolicy;
use crate::db::SubmissionStore;
use crate::email::Notifier;
use crate::error::{SendError, StoreError, ValidationError};
use crate::models::Submission;

pub const MSG_THANK_YOU: &str = "Thank you for your message. We will get back to you soon!";
pub const MSG_METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const MSG_FIELDS_REQUIRED: &str = "All fields are required";
pub const MSG_FAILURE: &str =
    "An error occurred while processing your request. Please try again later.";

/// A request as seen by the handler, independent of the hosting environment.
#[derive(Debug, Clone)]
pub struct ContactRequest {
    pub method: Method,
    pub origin: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContactResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ContactResponse {
    fn empty(status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            status,
            headers,
            body: String::new(),
        }
    }

    fn json(status: StatusCode, mut headers: HeaderMap, body: serde_json::Value) -> Self {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            status,
            headers,
            body: body.to_string(),
        }
    }
}

impl IntoResponse for ContactResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Result of both side effects for one submission.
#[derive(Debug)]
pub struct Delivery {
    pub stored: Result<(), StoreError>,
    pub sent: Result<(), SendError>,
}

impl Delivery {
    /// The submission reached us if at least one side effect landed.
    pub fn reached_us(&self) -> bool {
        self.stored.is_ok() || self.sent.is_ok()
    }
}

#[derive(Debug)]
pub enum ContactOutcome {
    Preflight,
    MethodNotAllowed,
    Invalid(ValidationError),
    Delivered(Delivery),
}

pub struct ContactService {
    store: Arc<dyn SubmissionStore>,
    notifier: Arc<dyn Notifier>,
    cors: CorsPolicy,
}

impl ContactService {
    pub fn new(store: Arc<dyn SubmissionStore>, notifier: Arc<dyn Notifier>, cors: CorsPolicy) -> Self {
        Self {
            store,
            notifier,
            cors,
        }
    }

    pub async fn handle(&self, request: ContactRequest) -> ContactResponse {
        let headers = self.cors.headers(request.origin.as_deref());

        match self.process(&request).await {
            ContactOutcome::Preflight => ContactResponse::empty(StatusCode::NO_CONTENT, headers),
            ContactOutcome::MethodNotAllowed => ContactResponse::json(
                StatusCode::METHOD_NOT_ALLOWED,
                headers,
                json!({ "success": false, "message": MSG_METHOD_NOT_ALLOWED }),
            ),
            ContactOutcome::Invalid(_) => ContactResponse::json(
                StatusCode::BAD_REQUEST,
                headers,
                json!({ "success": false, "message": MSG_FIELDS_REQUIRED }),
            ),
            ContactOutcome::Delivered(delivery) if delivery.reached_us() => ContactResponse::json(
                StatusCode::OK,
                headers,
                json!({ "success": true, "message": MSG_THANK_YOU }),
            ),
            ContactOutcome::Delivered(_) => ContactResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                headers,
                json!({ "success": false, "message": MSG_FAILURE }),
            ),
        }
    }

    pub async fn process(&self, request: &ContactRequest) -> ContactOutcome {
        if request.method == Method::OPTIONS {
            return ContactOutcome::Preflight;
        }
        if request.method != Method::POST {
            return ContactOutcome::MethodNotAllowed;
        }

        let submission = match parser::parse_form(request.content_type.as_deref(), request.body.as_deref())
            .and_then(Submission::from_form)
        {
            Ok(submission) => submission,
            Err(e) => {
                tracing::debug!("Rejected contact submission: {e}");
                return ContactOutcome::Invalid(e);
            }
        };

        ContactOutcome::Delivered(self.deliver(&submission).await)
    }

    /// Store and notify concurrently. A panic in either counts as that side effect failing.
    pub async fn deliver(&self, submission: &Submission) -> Delivery {
        let store = async {
            match AssertUnwindSafe(self.store.save(submission)).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Panicked),
            }
        };
        let send = async {
            match AssertUnwindSafe(self.notifier.send(submission)).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(SendError::Panicked),
            }
        };

        let (stored, sent) = tokio::join!(store, send);
        let id = submission.id();

        match &stored {
            Ok(()) => tracing::info!(submission_id = %id, "Submission saved"),
            Err(e) => tracing::warn!(submission_id = %id, "Failed to save submission: {e}"),
        }
        match (&stored, &sent) {
            (_, Ok(())) => {}
            (Ok(()), Err(e)) => {
                tracing::warn!(submission_id = %id, "Notification failed, submission was saved: {e}")
            }
            (Err(_), Err(e)) => {
                tracing::error!(submission_id = %id, "Notification failed and nothing was saved: {e}")
            }
        }

        Delivery { stored, sent }
    }

    pub fn health(&self, request: &ContactRequest) -> ContactResponse {
        health_response(&self.cors, request)
    }
}

/// Liveness probe shared by every entry point.
pub fn health_response(cors: &CorsPolicy, request: &ContactRequest) -> ContactResponse {
    let headers = cors.headers(request.origin.as_deref());
    if request.method == Method::OPTIONS {
        return ContactResponse::empty(StatusCode::NO_CONTENT, headers);
    }
    ContactResponse::json(StatusCode::OK, headers, json!({ "status": "ok" }))
}
