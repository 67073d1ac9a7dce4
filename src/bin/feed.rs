//! Sensorboard Feed
//!
//! Standalone synthetic data generator. Appends readings to the same
//! database the API server reads, until interrupted.
//!
//! Run with: cargo run --bin sensorboard-feed -- --interval 5

use clap::Parser;
use sensorboard::config::Config;
use sensorboard::ingest::{IngestFeed, ReadingGenerator};
use sensorboard::store::SqliteStore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sensorboard-feed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Write synthetic sensor readings on a timer")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long)]
    db: Option<String>,

    /// Seconds between batches (overrides config)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Readings per batch (overrides config)
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Seed for reproducible data
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(db) = args.db {
        config.store.db_path = db;
    }
    if let Some(interval) = args.interval {
        config.feed.interval_secs = interval;
    }
    if let Some(batch_size) = args.batch_size {
        config.feed.batch_size = batch_size;
    }
    config.feed.enabled = true;
    config.feed.validate()?;

    config.logging.init_tracing();

    let store = Arc::new(SqliteStore::with_config(&config.store)?);

    let feed = match args.seed {
        Some(seed) => IngestFeed::with_generator(
            Arc::clone(&store),
            config.feed.clone(),
            ReadingGenerator::with_seed(seed, config.feed.buildings, config.feed.floors),
        ),
        None => IngestFeed::new(Arc::clone(&store), config.feed.clone())?,
    };

    let handle = Arc::new(feed).start();
    tracing::info!("Data generation started, press Ctrl+C to stop");

    sensorboard::api::shutdown_signal().await;
    handle.abort();

    tracing::info!(readings = store.count()?, "Data generation stopped");
    Ok(())
}
