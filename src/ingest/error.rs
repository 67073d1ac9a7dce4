//! Ingest feed error types

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur while producing readings
#[derive(Error, Debug)]
pub enum IngestError {
    /// The store rejected the batch
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The blocking insert task panicked or was cancelled
    #[error("Insert task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Feed settings are unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;
