use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE,
};
use axum::http::{HeaderMap, HeaderValue};

pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://covechildcare.co.uk",
    "http://localhost:5173",
    "http://localhost:3000",
    "http://localhost:8000",
    "http://localhost:8080",
];

const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const MAX_AGE_SECS: &str = "86400";

/// Cross-origin headers for every response. The caller's origin is echoed
/// when allow-listed, otherwise `*`.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed: Vec<HeaderValue>,
}

impl CorsPolicy {
    /// Origins that are not valid header values can never match a request and are skipped.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = origins
            .into_iter()
            .filter_map(|o| HeaderValue::from_str(o.as_ref().trim()).ok())
            .collect();
        Self { allowed }
    }

    pub fn headers(&self, request_origin: Option<&str>) -> HeaderMap {
        let origin = request_origin
            .and_then(|o| self.allowed.iter().find(|allowed| *allowed == o))
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*"));

        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
        headers
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_ORIGINS)
    }
}
