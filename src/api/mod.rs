//! Sensorboard REST API
//!
//! HTTP API layer for the dashboards, built with Axum. Every read goes
//! through the query engine on a blocking thread.
//!
//! # Endpoints
//!
//! ## Catalog
//! - `GET /api/v1/buildings` - Distinct buildings (404 when none)
//! - `GET /api/v1/floors/:building` - Distinct floors, `all` for every building
//! - `GET /api/v1/sensor-types` - Distinct sensor types
//! - `GET /api/v1/sensor-distribution` - Reading count per sensor type
//!
//! ## Series
//! - `GET /api/v1/series/:building/:sensor_type/:timeline` - Single-building series
//! - `GET /api/v1/data/:building/:floor/:sensor_type/:timeline/:aggregation` - Dashboard data
//! - `GET /api/v1/table` - Paginated tabular data
//!
//! ## Export
//! - `GET /api/v1/export/:format` - csv, json or ndjson
//!
//! ## Readings
//! - `POST /api/v1/readings` - Inject one reading
//! - `POST /api/v1/readings/batch` - Inject a batch of readings
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use sensorboard::api::{serve, ApiConfig, AppState};
//! use sensorboard::store::SqliteStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("sensor_data.db")?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    let api_routes = Router::new()
        // Catalog routes
        .route("/buildings", get(routes::catalog::list_buildings))
        .route("/floors/:building", get(routes::catalog::list_floors))
        .route("/sensor-types", get(routes::catalog::list_sensor_types))
        .route(
            "/sensor-distribution",
            get(routes::catalog::sensor_distribution),
        )
        // Series routes
        .route(
            "/series/:building/:sensor_type/:timeline",
            get(routes::series::time_series),
        )
        .route(
            "/data/:building/:floor/:sensor_type/:timeline/:aggregation",
            get(routes::series::sensor_data),
        )
        .route("/table", get(routes::series::table))
        // Export routes
        .route("/export/:format", get(routes::export::export_data))
        // Manual injection
        .route("/readings", post(routes::readings::create_reading))
        .route(
            "/readings/batch",
            post(routes::readings::create_readings_batch),
        )
        .layer(DefaultBodyLimit::max(max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Sensorboard API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Sensorboard API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
