//! Sensorboard API Server
//!
//! Run with: cargo run --bin sensorboard
//!
//! # Configuration
//!
//! Read from `--config <path>` or the default locations
//! (`~/.config/sensorboard/config.toml`, `/etc/sensorboard/config.toml`,
//! `./config.toml`). Environment variables override the file:
//! - `SENSORBOARD_DB_PATH`: SQLite database file (default: sensor_data.db)
//! - `SENSORBOARD_API_HOST` / `SENSORBOARD_API_PORT`: Bind address (default: 0.0.0.0:5000)
//! - `SENSORBOARD_FEED_ENABLED`: Run the synthetic feed in-process (default: false)
//! - `SENSORBOARD_FEED_INTERVAL_SECS`: Seconds between feed batches (default: 5)
//! - `SENSORBOARD_LOG_LEVEL` / `SENSORBOARD_LOG_FORMAT`: Logging (default: info, pretty)
//! - `RUST_LOG`: Full filter directive, wins over the log level

use clap::Parser;
use sensorboard::api::{serve, AppState};
use sensorboard::config::Config;
use sensorboard::ingest::IngestFeed;
use sensorboard::store::SqliteStore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sensorboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Building sensor dashboard API server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run the synthetic ingest feed regardless of config
    #[arg(long)]
    feed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if args.feed {
        config.feed.enabled = true;
    }

    config.logging.init_tracing();

    tracing::info!("Starting Sensorboard API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.store.db_path);

    let store = Arc::new(SqliteStore::with_config(&config.store)?);

    let feed_handle = if config.feed.enabled {
        let feed = Arc::new(IngestFeed::new(Arc::clone(&store), config.feed.clone())?);
        Some(feed.start())
    } else {
        tracing::info!("Ingest feed disabled (set SENSORBOARD_FEED_ENABLED=true to enable)");
        None
    };

    let state = AppState::new(Arc::clone(&store), config.api.clone());

    tracing::info!("Starting server on {}:{}", config.api.host, config.api.port);
    serve(state, &config.api).await?;

    if let Some(handle) = feed_handle {
        handle.abort();
        tracing::info!("Ingest feed stopped");
    }

    tracing::info!("Sensorboard API server stopped");
    Ok(())
}
