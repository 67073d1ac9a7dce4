//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::query::{ErrorKind, QueryError};
use crate::store::StoreError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query validation or execution error
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Store write or connection error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl ApiError {
    /// HTTP status and stable error kind
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Query(e) => match e.kind() {
                ErrorKind::ValidationError => (StatusCode::BAD_REQUEST, e.kind().as_str()),
                ErrorKind::StoreUnavailable => {
                    (StatusCode::INTERNAL_SERVER_ERROR, e.kind().as_str())
                }
            },
            ApiError::Store(StoreError::InvalidReading(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_kind = %kind,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_kind = %kind,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                kind: kind.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_map_by_kind() {
        let err = ApiError::from(QueryError::Validation("Unknown sensor type: foo".to_string()));
        assert_eq!(
            err.status_and_kind(),
            (StatusCode::BAD_REQUEST, "validation_error")
        );
        assert_eq!(err.to_string(), "Validation error: Unknown sensor type: foo");

        let err = ApiError::from(QueryError::from(rusqlite::Error::InvalidQuery));
        assert_eq!(
            err.status_and_kind(),
            (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable")
        );
    }

    #[test]
    fn test_invalid_reading_is_bad_request() {
        let err = ApiError::from(StoreError::InvalidReading("building cannot be empty".into()));
        assert_eq!(err.status_and_kind().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found() {
        let err = ApiError::NotFound("No buildings found".to_string());
        assert_eq!(err.status_and_kind(), (StatusCode::NOT_FOUND, "not_found"));
    }
}
