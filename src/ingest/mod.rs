//! Ingest
//!
//! Synthetic data production for demos and load:
//!
//! - **ReadingGenerator**: Random readings across buildings and floors
//! - **IngestFeed**: Interval task inserting generated batches into the store
//!
//! Manual injection goes through the API's `/readings` endpoints instead.

mod error;
mod feed;
mod generator;

pub use error::{IngestError, IngestResult};
pub use feed::{FeedConfig, IngestFeed};
pub use generator::{ReadingGenerator, SENSORS_PER_FLOOR};
