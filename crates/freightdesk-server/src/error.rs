use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use freightdesk_core::CoreError;
use freightdesk_store::error::{StoreError, StoreErrorKind};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<&'static str>,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("Unauthorized: Invalid or missing API key")]
    Unauthorized,
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [&'static str]>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Validation {
            message: err.to_string(),
            fields: err.fields(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_validation() {
            return ApiError::Validation {
                message: err.to_string(),
                fields: err.fields(),
            };
        }
        match err.kind() {
            StoreErrorKind::NotFound => ApiError::NotFound(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation {
            message: rejection.body_text(),
            fields: Vec::new(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation {
            message: rejection.body_text(),
            fields: vec!["id"],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let fields = match &self {
            ApiError::Validation { fields, .. } => Some(fields.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            error: &message,
            fields,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use freightdesk_core::{CallId, CoreError};
    use freightdesk_store::error::StoreError;

    #[test]
    fn store_errors_map_onto_taxonomy() {
        let err = ApiError::from(StoreError::MissingCall(CallId(3)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::Validation { ref fields, .. } if fields == &vec!["call_id"]));

        let err = ApiError::from(StoreError::NotFound("call 3".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::from(StoreError::Migration("boom".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = ApiError::from(StoreError::Core(CoreError::MissingFields(vec!["dba"])));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
