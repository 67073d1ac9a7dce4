//! Core data types for the reading store
//!
//! - `SensorType`: the sensor tag, with the four built-in kinds plus any other label
//! - `Reading`: a stored observation, as read back from the table
//! - `NewReading`: an observation waiting to be inserted

use crate::store::error::{StoreError, StoreResult};
use chrono::{NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Storage format of the `timestamp` column (second resolution, sortable as text)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp the way it is stored
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp in storage format, ISO 8601 without zone, or RFC 3339
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts);
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Current time truncated to whole seconds
pub fn now_seconds() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Serde adapter keeping timestamps in storage format on the wire
pub mod timestamp_format {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

/// Kind of sensor a reading came from
///
/// The set is open: anything that is not one of the built-in kinds is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SensorType {
    Temperature,
    Humidity,
    Pressure,
    /// Discrete on/off status readings (fan, rotor, pipe)
    Digital,
    Other(String),
}

impl SensorType {
    /// Sensor kinds the system knows about without looking at the data
    pub const BUILTIN: [SensorType; 4] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::Pressure,
        SensorType::Digital,
    ];

    /// Parse a sensor tag; built-in kinds match case-insensitively
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "temperature" => Self::Temperature,
            "humidity" => Self::Humidity,
            "pressure" => Self::Pressure,
            "digital" => Self::Digital,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Tag as stored in the `sensor_type` column
    pub fn as_str(&self) -> &str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Digital => "digital",
            Self::Other(s) => s,
        }
    }

    /// Display unit shown next to values of this kind
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Pressure => "hPa",
            Self::Digital => "Status",
            Self::Other(_) => "",
        }
    }

    pub fn is_digital(&self) -> bool {
        matches!(self, Self::Digital)
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for SensorType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for SensorType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<SensorType> for String {
    fn from(t: SensorType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored sensor observation
///
/// Readings are immutable once written; the table only grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: i64,
    pub building: String,
    pub floor: i64,
    pub sensor_id: Option<i64>,
    pub sensor_type: SensorType,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
    pub status: Option<String>,
    pub fan_status: Option<String>,
    pub rotor_status: Option<String>,
    pub pipe_status: Option<String>,
    pub fan_id: Option<String>,
}

/// A reading waiting to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub building: String,
    pub floor: i64,
    pub sensor_id: Option<i64>,
    pub sensor_type: SensorType,
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
    pub status: Option<String>,
    pub fan_status: Option<String>,
    pub rotor_status: Option<String>,
    pub pipe_status: Option<String>,
    pub fan_id: Option<String>,
}

impl NewReading {
    /// Create a reading stamped with the current time
    pub fn new(
        building: impl Into<String>,
        floor: i64,
        sensor_type: impl Into<SensorType>,
        value: Option<f64>,
    ) -> Self {
        Self {
            building: building.into(),
            floor,
            sensor_id: None,
            sensor_type: sensor_type.into(),
            timestamp: now_seconds(),
            value,
            status: None,
            fan_status: None,
            rotor_status: None,
            pipe_status: None,
            fan_id: None,
        }
    }

    /// Builder method: set timestamp
    pub fn at(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder method: set the physical sensor number
    pub fn sensor_id(mut self, id: i64) -> Self {
        self.sensor_id = Some(id);
        self
    }

    /// Builder method: set the unit status label
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builder method: set fan, rotor and pipe status labels
    pub fn equipment(
        mut self,
        fan: impl Into<String>,
        rotor: impl Into<String>,
        pipe: impl Into<String>,
    ) -> Self {
        self.fan_status = Some(fan.into());
        self.rotor_status = Some(rotor.into());
        self.pipe_status = Some(pipe.into());
        self
    }

    /// Builder method: set the fan identifier
    pub fn fan_id(mut self, fan_id: impl Into<String>) -> Self {
        self.fan_id = Some(fan_id.into());
        self
    }

    /// Reject readings the table must never contain
    pub fn validate(&self) -> StoreResult<()> {
        if self.building.trim().is_empty() {
            return Err(StoreError::InvalidReading(
                "building cannot be empty".to_string(),
            ));
        }
        if self.sensor_type.as_str().trim().is_empty() {
            return Err(StoreError::InvalidReading(
                "sensor type cannot be empty".to_string(),
            ));
        }
        if let Some(v) = self.value {
            if !v.is_finite() {
                return Err(StoreError::InvalidReading(format!(
                    "value must be finite, got {}",
                    v
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_type_parse() {
        assert_eq!(SensorType::parse("Temperature"), SensorType::Temperature);
        assert_eq!(SensorType::parse(" digital "), SensorType::Digital);
        assert_eq!(
            SensorType::parse("co2"),
            SensorType::Other("co2".to_string())
        );
        assert!(!SensorType::parse("co2").is_builtin());
    }

    #[test]
    fn test_sensor_type_units() {
        assert_eq!(SensorType::Temperature.unit(), "°C");
        assert_eq!(SensorType::Humidity.unit(), "%");
        assert_eq!(SensorType::Pressure.unit(), "hPa");
        assert_eq!(SensorType::Digital.unit(), "Status");
        assert_eq!(SensorType::parse("co2").unit(), "");
    }

    #[test]
    fn test_sensor_type_serde() {
        let json = serde_json::to_string(&SensorType::Humidity).unwrap();
        assert_eq!(json, "\"humidity\"");

        let parsed: SensorType = serde_json::from_str("\"PRESSURE\"").unwrap();
        assert_eq!(parsed, SensorType::Pressure);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDateTime::parse_from_str("2024-03-01 10:00:10", TIMESTAMP_FORMAT)
            .unwrap();

        assert_eq!(parse_timestamp("2024-03-01 10:00:10"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:00:10"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:00:10Z"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_now_seconds_has_no_fraction() {
        let now = now_seconds();
        assert_eq!(now.nanosecond(), 0);
    }

    #[test]
    fn test_new_reading_validation() {
        assert!(NewReading::new("1", 1, "temperature", Some(21.5))
            .validate()
            .is_ok());
        assert!(NewReading::new("", 1, "temperature", Some(21.5))
            .validate()
            .is_err());
        assert!(NewReading::new("1", 1, "", None).validate().is_err());
        assert!(NewReading::new("1", 1, "temperature", Some(f64::NAN))
            .validate()
            .is_err());
    }

    #[test]
    fn test_reading_serializes_storage_timestamp() {
        let ts = parse_timestamp("2024-03-01 10:00:10").unwrap();
        let reading = Reading {
            id: 1,
            building: "1".to_string(),
            floor: 2,
            sensor_id: None,
            sensor_type: SensorType::Temperature,
            timestamp: ts,
            value: Some(20.0),
            status: None,
            fan_status: None,
            rotor_status: None,
            pipe_status: None,
            fan_id: None,
        };

        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["timestamp"], "2024-03-01 10:00:10");
        assert_eq!(json["sensor_type"], "temperature");
    }
}
