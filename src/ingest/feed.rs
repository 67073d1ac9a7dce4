//! Ingest Feed
//!
//! Timer-driven producer that appends synthetic readings to the store.
//! It is the store's only continuous writer and runs independently of the
//! query engine.

use crate::ingest::error::{IngestError, IngestResult};
use crate::ingest::generator::ReadingGenerator;
use crate::store::SqliteStore;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Run the feed inside the server process
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between batches
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Buildings are numbered 1..=buildings
    #[serde(default = "default_buildings")]
    pub buildings: u32,

    /// Floors are numbered 1..=floors
    #[serde(default = "default_floors")]
    pub floors: u32,

    /// Readings inserted per tick
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_interval_secs() -> u64 {
    5
}

fn default_buildings() -> u32 {
    10
}

fn default_floors() -> u32 {
    5
}

fn default_batch_size() -> usize {
    1
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
            buildings: default_buildings(),
            floors: default_floors(),
            batch_size: default_batch_size(),
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> IngestResult<()> {
        if self.interval_secs == 0 {
            return Err(IngestError::Config(
                "interval_secs must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(IngestError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Periodic synthetic-data producer
pub struct IngestFeed {
    store: Arc<SqliteStore>,
    generator: Mutex<ReadingGenerator>,
    config: FeedConfig,
}

impl IngestFeed {
    /// Create a feed writing into `store`
    pub fn new(store: Arc<SqliteStore>, config: FeedConfig) -> IngestResult<Self> {
        config.validate()?;
        let generator = ReadingGenerator::new(config.buildings, config.floors);
        Ok(Self::with_generator(store, config, generator))
    }

    /// Create a feed with a caller-supplied generator
    pub fn with_generator(
        store: Arc<SqliteStore>,
        config: FeedConfig,
        generator: ReadingGenerator,
    ) -> Self {
        Self {
            store,
            generator: Mutex::new(generator),
            config,
        }
    }

    /// Generate and insert one batch
    ///
    /// Returns the number of readings written.
    pub async fn tick_once(&self) -> IngestResult<usize> {
        let batch = self.generator.lock().await.batch(self.config.batch_size);

        let store = Arc::clone(&self.store);
        let inserted = tokio::task::spawn_blocking(move || store.insert_batch(&batch)).await??;

        Ok(inserted)
    }

    /// Start the feed loop
    ///
    /// The first batch is written immediately. A failed tick is logged and
    /// the loop keeps going; abort the returned handle to stop it.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tracing::info!(
            interval_secs = self.config.interval_secs,
            batch_size = self.config.batch_size,
            buildings = self.config.buildings,
            floors = self.config.floors,
            "Starting ingest feed"
        );

        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_secs(self.config.interval_secs));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match self.tick_once().await {
                    Ok(inserted) => {
                        tracing::debug!(inserted, "Ingest feed wrote batch");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Ingest feed tick failed");
                    }
                }
            }
        })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}
