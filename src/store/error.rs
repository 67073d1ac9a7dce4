//! Store error types
//!
//! Defines all errors that can occur while talking to the reading store.

use thiserror::Error;

/// Errors that can occur in the store layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed (creating the data directory, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite reported an error while opening or querying the database
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A reading was rejected before reaching the database
    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    /// A stored row could not be decoded
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::InvalidReading("building cannot be empty".to_string());
        assert_eq!(err.to_string(), "Invalid reading: building cannot be empty");
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
