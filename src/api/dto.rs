//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::query::{AggregateRow, DigitalRow, Page, QueryRequest, WILDCARD};
use crate::store::{now_seconds, parse_timestamp, NewReading, SensorType};

// ============================================
// QUERY DTOs
// ============================================

/// Query string of `GET /api/v1/table`
///
/// Every filter defaults to the wildcard; the timeline defaults to `raw`
/// and the aggregation to `raw`.
#[derive(Debug, Default, Deserialize)]
pub struct TableParams {
    #[serde(default)]
    pub building_id: Option<String>,
    #[serde(default)]
    pub floor_id: Option<String>,
    #[serde(default)]
    pub sensor_type: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub aggregation: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl TableParams {
    pub fn to_request(&self) -> ApiResult<QueryRequest> {
        let page = Page::from_params(self.limit, self.offset)?;
        Ok(QueryRequest::from_params(
            self.building_id.as_deref().unwrap_or(WILDCARD),
            self.floor_id.as_deref().unwrap_or(WILDCARD),
            self.sensor_type.as_deref().unwrap_or(WILDCARD),
            self.timeline.as_deref().unwrap_or("raw"),
            self.aggregation.as_deref().unwrap_or("raw"),
            page,
        )?)
    }
}

/// Optional pagination on path-addressed queries
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

impl PageParams {
    pub fn to_page(&self) -> ApiResult<Page> {
        Ok(Page::from_params(self.limit, self.offset)?)
    }
}

/// Body of `GET /api/v1/data/...`: status rows for digital sensors,
/// aggregated buckets for everything else
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SensorDataResponse {
    Digital(Vec<DigitalRow>),
    Aggregated(Vec<AggregateRow>),
}

// ============================================
// INGEST DTOs
// ============================================

/// Manually injected reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingRequest {
    pub building_id: String,
    pub floor_number: i64,
    #[serde(default)]
    pub sensor_id: Option<i64>,
    pub sensor_type: String,
    #[serde(default)]
    pub value: Option<f64>,
    /// Defaults to now; storage format, ISO 8601 or RFC 3339
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub fan_status: Option<String>,
    #[serde(default)]
    pub rotor_status: Option<String>,
    #[serde(default)]
    pub pipe_status: Option<String>,
    #[serde(default)]
    pub fan_id: Option<String>,
}

impl ReadingRequest {
    /// Convert into a storable reading
    pub fn into_reading(self) -> ApiResult<NewReading> {
        let timestamp = match &self.timestamp {
            Some(raw) => parse_timestamp(raw)
                .ok_or_else(|| ApiError::Validation(format!("Cannot parse timestamp: {}", raw)))?,
            None => now_seconds(),
        };

        Ok(NewReading {
            building: self.building_id.trim().to_string(),
            floor: self.floor_number,
            sensor_id: self.sensor_id,
            sensor_type: SensorType::parse(&self.sensor_type),
            timestamp,
            value: self.value,
            status: self.status,
            fan_status: self.fan_status,
            rotor_status: self.rotor_status,
            pipe_status: self.pipe_status,
            fan_id: self.fan_id,
        })
    }
}

/// Batch of manually injected readings
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchReadingRequest {
    pub readings: Vec<ReadingRequest>,
}

/// Single reading ingest response
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Status: "ok"
    pub status: String,
    /// Row id of the stored reading
    pub id: i64,
    /// Stored timestamp
    pub timestamp: String,
}

/// Batch ingest response
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchIngestResponse {
    /// Status: "ok"
    pub status: String,
    /// Number of readings stored
    pub accepted: usize,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy, unhealthy
    pub status: String,
    /// Store status
    pub store: String,
    /// Stored reading count, when the store answered
    pub readings: Option<u64>,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

// ============================================
// EXPORT DTOs
// ============================================

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Ndjson,
}

impl ExportFormat {
    /// Parse the `:format` path segment
    pub fn parse(s: &str) -> ApiResult<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            "excel" | "xlsx" | "pdf" => Err(ApiError::Validation(format!(
                "Export format '{}' is not supported, use csv, json or ndjson",
                s
            ))),
            _ => Err(ApiError::Validation(format!("Invalid format: {}", s))),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Ndjson => "application/x-ndjson",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Aggregation, Filter, Timeline};

    #[test]
    fn test_table_params_defaults() {
        let request = TableParams::default().to_request().unwrap();

        assert!(request.building.is_all());
        assert!(request.floor.is_all());
        assert!(request.sensor_type.is_all());
        assert_eq!(request.timeline, Timeline::Raw);
        assert_eq!(request.aggregation, Aggregation::Raw);
        assert_eq!(request.page, Page::default());
    }

    #[test]
    fn test_table_params_reject_bad_floor() {
        let params = TableParams {
            floor_id: Some("roof".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.to_request(), Err(ApiError::Query(_))));
    }

    #[test]
    fn test_reading_request_conversion() {
        let req: ReadingRequest = serde_json::from_str(
            r#"{"building_id": " 3 ", "floor_number": 2, "sensor_type": "Humidity",
                "value": 41.5, "timestamp": "2024-03-01T10:00:00"}"#,
        )
        .unwrap();

        let reading = req.into_reading().unwrap();
        assert_eq!(reading.building, "3");
        assert_eq!(reading.sensor_type, SensorType::Humidity);
        assert_eq!(
            reading.timestamp,
            parse_timestamp("2024-03-01 10:00:00").unwrap()
        );
    }

    #[test]
    fn test_reading_request_bad_timestamp() {
        let req = ReadingRequest {
            building_id: "1".to_string(),
            floor_number: 1,
            sensor_id: None,
            sensor_type: "temperature".to_string(),
            value: Some(21.0),
            timestamp: Some("yesterday".to_string()),
            status: None,
            fan_status: None,
            rotor_status: None,
            pipe_status: None,
            fan_id: None,
        };
        assert!(matches!(req.into_reading(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!(ExportFormat::parse("CSV").unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::parse("pdf").is_err());
        assert!(ExportFormat::parse("xml").is_err());
        assert_eq!(ExportFormat::Ndjson.content_type(), "application/x-ndjson");
    }

    #[test]
    fn test_filter_wildcard_is_all() {
        let params = TableParams {
            building_id: Some("all".to_string()),
            sensor_type: Some("temperature".to_string()),
            ..Default::default()
        };
        let request = params.to_request().unwrap();
        assert_eq!(request.building, Filter::All);
        assert_eq!(request.sensor_type, Filter::Only(SensorType::Temperature));
    }
}
