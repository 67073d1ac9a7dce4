//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::ApiConfig;
use crate::ingest::FeedConfig;
use crate::store::StoreConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub fn directive(&self) -> String {
        format!("sensorboard={},tower_http=debug", self.level)
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Install the global tracing subscriber
    ///
    /// `RUST_LOG` wins over the configured level.
    pub fn init_tracing(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()));

        let registry = tracing_subscriber::registry().with(filter);

        if self.is_json() {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("sensorboard").join("config.toml")),
            Some(PathBuf::from("/etc/sensorboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Store overrides
        if let Some(db_path) = var("SENSORBOARD_DB_PATH") {
            self.store.db_path = db_path;
        }

        // API overrides
        if let Some(host) = var("SENSORBOARD_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("SENSORBOARD_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Feed overrides
        if let Some(enabled) = var("SENSORBOARD_FEED_ENABLED") {
            if let Ok(e) = enabled.parse() {
                self.feed.enabled = e;
            }
        }
        if let Some(interval) = var("SENSORBOARD_FEED_INTERVAL_SECS") {
            if let Ok(i) = interval.parse() {
                self.feed.interval_secs = i;
            }
        }

        // Logging overrides
        if let Some(level) = var("SENSORBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SENSORBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Sensorboard Configuration
#
# Environment variables override these settings:
# - SENSORBOARD_DB_PATH
# - SENSORBOARD_API_HOST
# - SENSORBOARD_API_PORT
# - SENSORBOARD_FEED_ENABLED
# - SENSORBOARD_FEED_INTERVAL_SECS
# - SENSORBOARD_LOG_LEVEL
# - SENSORBOARD_LOG_FORMAT

[store]
# SQLite database file holding the sensor_data table
db_path = "sensor_data.db"

# How long a connection waits on a locked database (ms)
busy_timeout_ms = 5000

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 5000

# Maximum request body size in bytes
max_body_size = 10485760

# Largest accepted /readings/batch request
max_batch_size = 10000

# Enable the /export endpoint
enable_export = true

[feed]
# Run the synthetic data feed inside the server process
enabled = false

# Seconds between batches
interval_secs = 5

# Buildings and floors readings are spread over
buildings = 10
floors = 5

# Readings written per tick
batch_size = 1

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
