//! Reading Store
//!
//! The single append-only table of sensor readings, backed by SQLite:
//!
//! - **types**: Reading, NewReading, SensorType and timestamp helpers
//! - **sqlite**: Connection handling, schema, inserts
//! - **error**: Error types
//!
//! Nothing else in the crate opens the database file; the query engine and
//! the ingest feed both go through [`SqliteStore`].
//!
//! # Example
//!
//! ```rust,no_run
//! use sensorboard::store::{NewReading, SensorType, SqliteStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::open("sensor_data.db")?;
//!     store.insert(&NewReading::new("1", 2, SensorType::Temperature, Some(21.4)))?;
//!     println!("{} readings stored", store.count()?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod sqlite;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use sqlite::{reading_from_row, SqliteStore, StoreConfig, READING_COLUMNS};
pub use types::{
    format_timestamp, now_seconds, parse_timestamp, NewReading, Reading, SensorType,
    TIMESTAMP_FORMAT,
};
