//! Sensorboard Query Engine
//!
//! Answers the dashboard's questions about stored readings:
//!
//! - **Types**: Typed filters, timelines, aggregations and pages
//! - **Plan**: Fixed SQL templates with bound parameters
//! - **Engine**: Executes plans and shapes result rows
//!
//! # Timelines
//!
//! ```text
//! raw      one row per reading        2024-03-01 10:00:40
//! hourly   strftime hour bucket       2024-03-01 10:00:00
//! daily    calendar day               2024-03-01
//! weekly   Monday of the week         2024-02-26
//! monthly  calendar month             2024-03
//! yearly   calendar year              2024
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sensorboard::query::{Aggregation, QueryEngine, QueryRequest, Timeline};
//!
//! let engine = QueryEngine::new(store);
//!
//! let rows = engine.query_aggregated(
//!     &QueryRequest::all()
//!         .building("3")
//!         .sensor_type("temperature")
//!         .timeline(Timeline::Daily)
//!         .aggregation(Aggregation::Max),
//! )?;
//! ```

mod engine;
mod error;
mod plan;
mod rows;
mod types;

pub use engine::QueryEngine;
pub use error::{ErrorKind, QueryError, QueryResult};
pub use plan::QueryPlan;
pub use rows::{round2, AggregateRow, DigitalRow, DistinctValue, SensorCount, TimeSeriesPoint};
pub use types::{
    parse_building_filter, parse_floor_filter, parse_sensor_filter, Aggregation, DistinctColumn,
    Filter, Page, QueryRequest, Timeline, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, WILDCARD,
};
