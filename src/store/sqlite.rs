//! SQLite-backed reading store
//!
//! Owns the `sensor_data` table. Every caller gets its own connection from
//! [`SqliteStore::connect`], so a read runs as a single statement against a
//! consistent snapshot while the ingest feed keeps appending. WAL journal
//! mode lets readers proceed while a write is in flight.

use crate::store::error::{StoreError, StoreResult};
use crate::store::types::{format_timestamp, parse_timestamp, NewReading, Reading, SensorType};
use rusqlite::{params_from_iter, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS sensor_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        building_id TEXT NOT NULL,
        floor_number INTEGER NOT NULL,
        sensor_id INTEGER,
        sensor_type TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        value REAL,
        status TEXT,
        fan_status TEXT,
        rotor_status TEXT,
        pipe_status TEXT,
        fan_id TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_sensor_data_lookup
        ON sensor_data(sensor_type, building_id, floor_number, timestamp);
    CREATE INDEX IF NOT EXISTS idx_sensor_data_timestamp
        ON sensor_data(timestamp);
";

const INSERT_READING: &str = "
    INSERT INTO sensor_data (
        building_id, floor_number, sensor_id, sensor_type, timestamp, value,
        status, fan_status, rotor_status, pipe_status, fan_id
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

/// Column list matching [`reading_from_row`]
pub const READING_COLUMNS: &str = "id, building_id, floor_number, sensor_id, sensor_type, \
     timestamp, value, status, fan_status, rotor_status, pipe_status, fan_id";

/// Store configuration
#[derive(Debug, Clone, serde::Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// How long a connection waits on a locked database (ms)
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> String {
    "sensor_data.db".to_string()
}

fn default_busy_timeout() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

enum Location {
    File(PathBuf),
    /// Shared-cache in-memory database, addressed by URI
    Memory(String),
}

/// Handle to the reading store
///
/// Cheap to share behind an `Arc`; holds no connection of its own except the
/// anchor that keeps an in-memory database alive.
pub struct SqliteStore {
    location: Location,
    busy_timeout: Duration,
    _anchor: Option<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a file-backed store
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::with_config(&StoreConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        })
    }

    /// Open a file-backed store from configuration
    pub fn with_config(config: &StoreConfig) -> StoreResult<Self> {
        let path = PathBuf::from(&config.db_path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            location: Location::File(path),
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
            _anchor: None,
        };

        let conn = store.connect()?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch(SCHEMA)?;

        tracing::info!(path = %config.db_path, "Reading store opened");
        Ok(store)
    }

    /// Create a private in-memory store
    ///
    /// Each call gets a fresh database that lives as long as the store.
    pub fn in_memory() -> StoreResult<Self> {
        let uri = format!(
            "file:sensorboard-{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4()
        );

        let mut store = Self {
            location: Location::Memory(uri),
            busy_timeout: Duration::from_millis(default_busy_timeout()),
            _anchor: None,
        };

        let anchor = store.connect()?;
        anchor.execute_batch(SCHEMA)?;
        store._anchor = Some(Mutex::new(anchor));

        Ok(store)
    }

    /// Open a new connection to the store
    ///
    /// Failures here are what callers surface as "store unavailable".
    pub fn connect(&self) -> StoreResult<Connection> {
        let conn = match &self.location {
            Location::File(path) => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?,
            Location::Memory(uri) => Connection::open_with_flags(
                uri,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?,
        };
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }

    /// Check that the database answers
    pub fn ping(&self) -> StoreResult<()> {
        let conn = self.connect()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Append a single reading, returning its id
    pub fn insert(&self, reading: &NewReading) -> StoreResult<i64> {
        reading.validate()?;

        let conn = self.connect()?;
        conn.execute(INSERT_READING, params_from_iter(reading_params(reading)))?;
        let id = conn.last_insert_rowid();

        tracing::debug!(
            id,
            building = %reading.building,
            floor = reading.floor,
            sensor_type = %reading.sensor_type,
            "Reading stored"
        );
        Ok(id)
    }

    /// Append a batch of readings in one transaction
    ///
    /// The whole batch is validated first; nothing is written if any
    /// reading is rejected.
    pub fn insert_batch(&self, readings: &[NewReading]) -> StoreResult<usize> {
        for (index, reading) in readings.iter().enumerate() {
            reading.validate().map_err(|e| match e {
                StoreError::InvalidReading(msg) => {
                    StoreError::InvalidReading(format!("reading {}: {}", index, msg))
                }
                other => other,
            })?;
        }

        if readings.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_READING)?;
            for reading in readings {
                stmt.execute(params_from_iter(reading_params(reading)))?;
            }
        }
        tx.commit()?;

        tracing::debug!(count = readings.len(), "Reading batch stored");
        Ok(readings.len())
    }

    /// Total number of stored readings
    pub fn count(&self) -> StoreResult<u64> {
        let conn = self.connect()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM sensor_data", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn reading_params(reading: &NewReading) -> [rusqlite::types::Value; 11] {
    use rusqlite::types::Value;

    fn text(s: &Option<String>) -> Value {
        s.clone().map(Value::Text).unwrap_or(Value::Null)
    }

    [
        Value::Text(reading.building.trim().to_string()),
        Value::Integer(reading.floor),
        reading.sensor_id.map(Value::Integer).unwrap_or(Value::Null),
        Value::Text(reading.sensor_type.as_str().to_string()),
        Value::Text(format_timestamp(&reading.timestamp)),
        reading.value.map(Value::Real).unwrap_or(Value::Null),
        text(&reading.status),
        text(&reading.fan_status),
        text(&reading.rotor_status),
        text(&reading.pipe_status),
        text(&reading.fan_id),
    ]
}

/// Decode a row selected with [`READING_COLUMNS`]
pub fn reading_from_row(row: &Row<'_>) -> rusqlite::Result<Reading> {
    let raw_ts: String = row.get(5)?;
    let timestamp = parse_timestamp(&raw_ts).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            Box::new(StoreError::Corrupt(format!("bad timestamp: {}", raw_ts))),
        )
    })?;

    Ok(Reading {
        id: row.get(0)?,
        building: row.get(1)?,
        floor: row.get(2)?,
        sensor_id: row.get(3)?,
        sensor_type: SensorType::from(row.get::<_, String>(4)?),
        timestamp,
        value: row.get(6)?,
        status: row.get(7)?,
        fan_status: row.get(8)?,
        rotor_status: row.get(9)?,
        pipe_status: row.get(10)?,
        fan_id: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::parse_timestamp;
    use rusqlite::params;
    use tempfile::tempdir;

    fn reading(building: &str, ts: &str, value: f64) -> NewReading {
        NewReading::new(building, 1, SensorType::Temperature, Some(value))
            .at(parse_timestamp(ts).unwrap())
    }

    #[test]
    fn test_open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sensors.db");

        let store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.count().unwrap(), 0);

        // Reopening keeps the schema and data
        store.insert(&reading("1", "2024-03-01 10:00:00", 21.0)).unwrap();
        drop(store);
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }

    #[test]
    fn test_in_memory_stores_are_isolated() {
        let a = SqliteStore::in_memory().unwrap();
        let b = SqliteStore::in_memory().unwrap();

        a.insert(&reading("1", "2024-03-01 10:00:00", 21.0)).unwrap();

        assert_eq!(a.count().unwrap(), 1);
        assert_eq!(b.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_returns_increasing_ids() {
        let store = SqliteStore::in_memory().unwrap();

        let first = store.insert(&reading("1", "2024-03-01 10:00:00", 21.0)).unwrap();
        let second = store.insert(&reading("1", "2024-03-01 10:00:05", 22.0)).unwrap();

        assert!(second > first);
    }

    #[test]
    fn test_insert_rejects_invalid_reading() {
        let store = SqliteStore::in_memory().unwrap();
        let result = store.insert(&NewReading::new(" ", 1, "humidity", Some(40.0)));

        assert!(matches!(result, Err(StoreError::InvalidReading(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_batch_is_all_or_nothing() {
        let store = SqliteStore::in_memory().unwrap();

        let batch = vec![
            reading("1", "2024-03-01 10:00:00", 21.0),
            reading("", "2024-03-01 10:00:05", 22.0),
        ];
        let err = store.insert_batch(&batch).unwrap_err();
        assert!(err.to_string().contains("reading 1"));
        assert_eq!(store.count().unwrap(), 0);

        let batch = vec![
            reading("1", "2024-03-01 10:00:00", 21.0),
            reading("2", "2024-03-01 10:00:05", 22.0),
        ];
        assert_eq!(store.insert_batch(&batch).unwrap(), 2);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_reading_round_trips_through_row() {
        let store = SqliteStore::in_memory().unwrap();
        let new = NewReading::new("7", 3, SensorType::Digital, Some(1.0))
            .at(parse_timestamp("2024-03-01 10:00:00").unwrap())
            .sensor_id(4)
            .status("ON")
            .equipment("ON", "OFF", "ON")
            .fan_id("FAN-2");
        let id = store.insert(&new).unwrap();

        let conn = store.connect().unwrap();
        let sql = format!("SELECT {} FROM sensor_data WHERE id = ?1", READING_COLUMNS);
        let stored = conn
            .query_row(&sql, params![id], reading_from_row)
            .unwrap();

        assert_eq!(stored.building, "7");
        assert_eq!(stored.floor, 3);
        assert_eq!(stored.sensor_id, Some(4));
        assert_eq!(stored.sensor_type, SensorType::Digital);
        assert_eq!(stored.timestamp, new.timestamp);
        assert_eq!(stored.fan_status.as_deref(), Some("ON"));
        assert_eq!(stored.rotor_status.as_deref(), Some("OFF"));
        assert_eq!(stored.fan_id.as_deref(), Some("FAN-2"));
    }

    #[test]
    fn test_ping() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.ping().is_ok());
    }
}
