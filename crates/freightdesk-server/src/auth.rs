//! Shared-secret gate for write operations.
//!
//! The key travels in the `x-api-key` header. Reads of the ledger, the metrics
//! snapshot and the catalog are public so the dashboard can poll them without
//! a secret. With no key configured every gated request is rejected.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct ApiKey(Option<Arc<str>>);

impl ApiKey {
    pub fn new(key: Option<String>) -> Self {
        Self(key.map(Arc::from))
    }

    fn accepts(&self, presented: Option<&str>) -> bool {
        match (&self.0, presented) {
            (Some(expected), Some(presented)) => expected.as_ref() == presented,
            _ => false,
        }
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey")
            .field(&self.0.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

pub fn is_public(method: &Method, path: &str) -> bool {
    if matches!(path, "/" | "/health" | "/api/metrics") {
        return true;
    }
    if method != Method::GET {
        return false;
    }
    matches!(path, "/api/data" | "/data" | "/api/calls" | "/api/deals")
        || path.starts_with("/api/calls/")
        || path.starts_with("/api/deals/")
}

pub async fn require_api_key(State(key): State<ApiKey>, request: Request, next: Next) -> Response {
    if is_public(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if key.accepts(presented) {
        return next.run(request).await;
    }

    if key.0.is_none() {
        tracing::warn!("no api key configured, rejecting write request");
    } else {
        tracing::debug!(path = %request.uri().path(), "rejected request with invalid api key");
    }
    ApiError::Unauthorized.into_response()
}

#[cfg(test)]
mod tests {
    use super::{is_public, ApiKey};
    use axum::http::Method;

    #[test]
    fn reads_are_public_writes_are_not() {
        assert!(is_public(&Method::GET, "/api/calls"));
        assert!(is_public(&Method::GET, "/api/deals/4"));
        assert!(is_public(&Method::GET, "/api/metrics"));
        assert!(is_public(&Method::GET, "/data"));
        assert!(!is_public(&Method::POST, "/api/calls"));
        assert!(!is_public(&Method::DELETE, "/api/deals/4"));
        assert!(!is_public(&Method::PUT, "/api/calls/1"));
    }

    #[test]
    fn missing_key_rejects_everything() {
        let key = ApiKey::new(None);
        assert!(!key.accepts(Some("anything")));
        assert!(!key.accepts(None));

        let key = ApiKey::new(Some("s3cret".to_string()));
        assert!(key.accepts(Some("s3cret")));
        assert!(!key.accepts(Some("S3CRET")));
        assert!(!format!("{key:?}").contains("s3cret"));
    }
}
