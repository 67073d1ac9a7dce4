//! Query error types
//!
//! "Filter was invalid" is an error; "filter matched nothing" is an empty
//! result and never reaches this type.

use crate::store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// A filter value was rejected (unknown sensor type, non-numeric floor, bad page)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The store could not be reached or failed while running the statement
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Stable, serializable tag for a [`QueryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    StoreUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::StoreUnavailable => "store_unavailable",
        }
    }
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        QueryError::StoreUnavailable(StoreError::Sqlite(err))
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = QueryError::Validation("Unknown sensor type: foo".to_string());
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(err.kind().as_str(), "validation_error");

        let err: QueryError = rusqlite::Error::InvalidQuery.into();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::StoreUnavailable).unwrap();
        assert_eq!(json, "\"store_unavailable\"");
    }
}
