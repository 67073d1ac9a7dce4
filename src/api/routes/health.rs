//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (store answers)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 once the store accepts connections.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match check_store_health(&state).await {
        Some(_) => StatusCode::OK,
        None => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let readings = check_store_health(&state).await;

    let (status, store) = match readings {
        Some(_) => ("healthy", "ok"),
        None => ("unhealthy", "error"),
    };

    Json(HealthResponse {
        status: status.to_string(),
        store: store.to_string(),
        readings,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Ping the store and count readings; `None` when it does not answer
async fn check_store_health(state: &AppState) -> Option<u64> {
    let store = Arc::clone(&state.store);
    let result = tokio::task::spawn_blocking(move || {
        store.ping()?;
        store.count()
    })
    .await;

    match result {
        Ok(Ok(count)) => Some(count),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Store health check failed");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Store health check task failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
