//! API Routes
//!
//! Route handlers organized by functionality.

pub mod catalog;
pub mod export;
pub mod health;
pub mod readings;
pub mod series;

use crate::api::error::{ApiError, ApiResult};

/// Run a synchronous store or engine call off the async runtime
pub(crate) async fn blocking<T, E, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    ApiError: From<E>,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}
