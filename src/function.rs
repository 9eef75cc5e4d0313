use std::collections::{BTreeMap, HashMap};

use axum::http::Method;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::contact::{ContactRequest, ContactResponse, ContactService, health_response};
use crate::cors::CorsPolicy;

/// API-gateway proxy event as delivered to Lambda and Netlify functions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl FunctionEvent {
    /// Header lookup ignoring case; gateways differ on `origin` vs `Origin`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn to_request(&self) -> ContactRequest {
        let method = Method::from_bytes(self.http_method.trim().to_ascii_uppercase().as_bytes())
            .unwrap_or(Method::GET);

        let body = match (&self.body, self.is_base64_encoded) {
            (Some(raw), true) => STANDARD
                .decode(raw)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok()),
            (body, false) => body.clone(),
            (None, true) => None,
        };

        ContactRequest {
            method,
            origin: self.header("origin").map(str::to_string),
            content_type: self.header("content-type").map(str::to_string),
            body,
        }
    }
}

impl From<ContactResponse> for FunctionResponse {
    fn from(response: ContactResponse) -> Self {
        let headers = response
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        FunctionResponse {
            status_code: response.status.as_u16(),
            headers,
            body: response.body,
        }
    }
}

pub async fn handle_contact(service: &ContactService, event: FunctionEvent) -> FunctionResponse {
    service.handle(event.to_request()).await.into()
}

pub fn handle_health(cors: &CorsPolicy, event: FunctionEvent) -> FunctionResponse {
    health_response(cors, &event.to_request()).into()
}
