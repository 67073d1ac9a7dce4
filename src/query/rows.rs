//! Result rows
//!
//! Each engine operation returns one of these fixed-shape rows, so the
//! presentation layer never sees the table schema.

use crate::store::SensorType;
use serde::{Deserialize, Serialize};

/// Round to two decimals for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round_opt(value: Option<f64>) -> Option<f64> {
    value.map(round2)
}

/// A distinct column value; buildings and sensor types are text, floors are integers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistinctValue {
    Integer(i64),
    Text(String),
}

/// One point of a single-building time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Reading timestamp, or bucket label for bucketed timelines
    pub timestamp: String,
    pub value: Option<f64>,
}

/// Equipment status of one digital reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalRow {
    pub building: String,
    pub floor: i64,
    pub fan_status: Option<String>,
    pub rotor_status: Option<String>,
    pub pipe_status: Option<String>,
    pub fan_id: Option<String>,
    pub unit: String,
}

/// One bucket (or one reading, for the raw timeline) of a multi-dimensional query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Bucket label, or the reading timestamp for the raw timeline
    pub period: String,
    pub sensor_type: SensorType,
    /// Set for raw-timeline rows only; buckets span buildings
    pub building: Option<String>,
    /// Set for raw-timeline rows only
    pub floor: Option<i64>,
    pub value: Option<f64>,
    /// Number of readings that fell into the bucket
    pub samples: i64,
    /// Status fields of the last-seen reading in the bucket
    pub status: Option<String>,
    pub fan_status: Option<String>,
    pub rotor_status: Option<String>,
    pub pipe_status: Option<String>,
    pub fan_id: Option<String>,
    pub unit: String,
}

/// Number of readings per sensor type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorCount {
    pub sensor_type: SensorType,
    pub count: i64,
}
