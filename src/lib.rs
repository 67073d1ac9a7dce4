//! # Sensorboard
//!
//! Building sensor monitoring backend: stores temperature, humidity,
//! pressure and digital equipment-status readings in SQLite and serves
//! filtered, time-bucketed, aggregated views of them to dashboards.
//!
//! ## Modules
//!
//! - [`store`]: SQLite reading store, the single source of truth
//! - [`query`]: Read-only query engine (filters, timelines, aggregation)
//! - [`ingest`]: Synthetic reading generator and periodic feed
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sensorboard::query::{Aggregation, QueryEngine, QueryRequest, Timeline};
//! use sensorboard::store::{NewReading, SensorType, SqliteStore};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("sensor_data.db")?);
//!
//!     store.insert(&NewReading::new("1", 2, SensorType::Temperature, Some(22.5)))?;
//!
//!     let engine = QueryEngine::new(Arc::clone(&store));
//!     let rows = engine.query_aggregated(
//!         &QueryRequest::all()
//!             .building("1")
//!             .timeline(Timeline::Hourly)
//!             .aggregation(Aggregation::Avg),
//!     )?;
//!
//!     println!("Found {} hourly buckets", rows.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod ingest;
pub mod query;
pub mod store;

// Re-export top-level types for convenience
pub use store::{NewReading, Reading, SensorType, SqliteStore, StoreConfig, StoreError};

pub use query::{
    AggregateRow, Aggregation, DigitalRow, Filter, Page, QueryEngine, QueryError, QueryRequest,
    Timeline,
};

pub use ingest::{FeedConfig, IngestFeed, ReadingGenerator};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
