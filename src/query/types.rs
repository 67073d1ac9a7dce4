//! Query request types
//!
//! Everything a caller can ask of the engine is expressed with closed enums
//! and typed filters. Raw strings from the outside world are parsed here,
//! once, and never reach SQL text.

use crate::query::error::{QueryError, QueryResult};
use crate::store::SensorType;
use serde::{Deserialize, Serialize};

/// Default page size for aggregated queries
pub const DEFAULT_PAGE_LIMIT: u32 = 30;

/// Largest page a caller may request
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Wildcard accepted by every filter
pub const WILDCARD: &str = "all";

/// A filter on one dimension: either a specific value or the wildcard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<T> {
    /// No filter applied for this dimension
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T> Filter<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::All => None,
            Self::Only(v) => Some(v),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

fn is_wildcard(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case(WILDCARD)
}

/// Parse a building filter (`all` or an identifier)
pub fn parse_building_filter(s: &str) -> QueryResult<Filter<String>> {
    if is_wildcard(s) {
        return Ok(Filter::All);
    }
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(QueryError::Validation(
            "building cannot be empty".to_string(),
        ));
    }
    Ok(Filter::Only(trimmed.to_string()))
}

/// Parse a floor filter (`all` or an integer)
pub fn parse_floor_filter(s: &str) -> QueryResult<Filter<i64>> {
    if is_wildcard(s) {
        return Ok(Filter::All);
    }
    s.trim()
        .parse::<i64>()
        .map(Filter::Only)
        .map_err(|_| QueryError::Validation(format!("Invalid floor: {}", s)))
}

/// Parse a sensor-type filter (`all` or a tag)
///
/// Whether the tag is known is checked by the engine against the store.
pub fn parse_sensor_filter(s: &str) -> QueryResult<Filter<SensorType>> {
    if is_wildcard(s) {
        return Ok(Filter::All);
    }
    if s.trim().is_empty() {
        return Err(QueryError::Validation(
            "sensor type cannot be empty".to_string(),
        ));
    }
    Ok(Filter::Only(SensorType::parse(s)))
}

/// Bucket granularity for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeline {
    /// One row per reading
    #[default]
    Raw,
    Hourly,
    Daily,
    /// Weeks start on Monday
    Weekly,
    Monthly,
    Yearly,
}

impl Timeline {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "hourly" | "hour" => Some(Self::Hourly),
            "daily" | "day" => Some(Self::Daily),
            "weekly" | "week" => Some(Self::Weekly),
            "monthly" | "month" => Some(Self::Monthly),
            "yearly" | "year" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Parse, falling back to `Raw` for anything unrecognized
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            tracing::debug!(timeline = %s, "Unrecognized timeline, using raw");
            Self::Raw
        })
    }

    pub fn is_bucketed(&self) -> bool {
        !matches!(self, Self::Raw)
    }

    /// SQL expression producing the bucket label of `timestamp`
    ///
    /// Labels sort chronologically as text.
    pub(crate) fn bucket_expr(&self) -> &'static str {
        match self {
            Self::Raw => "timestamp",
            Self::Hourly => "strftime('%Y-%m-%d %H:00:00', timestamp)",
            Self::Daily => "strftime('%Y-%m-%d', timestamp)",
            Self::Weekly => "date(timestamp, 'weekday 0', '-6 days')",
            Self::Monthly => "strftime('%Y-%m', timestamp)",
            Self::Yearly => "strftime('%Y', timestamp)",
        }
    }
}

impl std::fmt::Display for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Hourly => write!(f, "hourly"),
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

/// Aggregation applied to `value` within a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Last-seen reading's value in the bucket
    Raw,
    Min,
    Max,
    /// Arithmetic mean of non-null values
    #[default]
    Avg,
}

impl Aggregation {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "avg" | "average" => Some(Self::Avg),
            _ => None,
        }
    }

    /// Parse, falling back to `Avg` for anything unrecognized
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            tracing::debug!(aggregation = %s, "Unrecognized aggregation, using avg");
            Self::Avg
        })
    }

    /// SQL window aggregate over the `bucket` window, `None` for `Raw`
    pub(crate) fn window_fn(&self) -> Option<&'static str> {
        match self {
            Self::Raw => None,
            Self::Min => Some("MIN(value) OVER bucket"),
            Self::Max => Some("MAX(value) OVER bucket"),
            Self::Avg => Some("AVG(value) OVER bucket"),
        }
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
            Self::Avg => write!(f, "avg"),
        }
    }
}

/// Limit/offset pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    /// Create a page, rejecting limits outside `1..=MAX_PAGE_LIMIT`
    pub fn new(limit: u32, offset: u32) -> QueryResult<Self> {
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(QueryError::Validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_LIMIT, limit
            )));
        }
        Ok(Self { limit, offset })
    }

    /// Build from optional signed query parameters, applying defaults
    pub fn from_params(limit: Option<i64>, offset: Option<i64>) -> QueryResult<Self> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT as i64);
        let offset = offset.unwrap_or(0);

        if offset < 0 {
            return Err(QueryError::Validation(format!(
                "offset cannot be negative, got {}",
                offset
            )));
        }
        let limit = u32::try_from(limit)
            .map_err(|_| QueryError::Validation(format!("Invalid limit: {}", limit)))?;
        let offset = u32::try_from(offset)
            .map_err(|_| QueryError::Validation(format!("Invalid offset: {}", offset)))?;

        Self::new(limit, offset)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Columns that can be listed with `list_distinct`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistinctColumn {
    Building,
    Floor,
    SensorType,
}

impl DistinctColumn {
    pub(crate) fn column_name(&self) -> &'static str {
        match self {
            Self::Building => "building_id",
            Self::Floor => "floor_number",
            Self::SensorType => "sensor_type",
        }
    }
}

/// A multi-dimensional aggregated query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryRequest {
    pub building: Filter<String>,
    pub floor: Filter<i64>,
    pub sensor_type: Filter<SensorType>,
    pub timeline: Timeline,
    pub aggregation: Aggregation,
    pub page: Page,
}

impl QueryRequest {
    /// Request over every building, floor and sensor type
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a request from the string parameters the dashboards send
    ///
    /// Filters are strict; timeline and aggregation fall back to their
    /// defaults when unrecognized.
    pub fn from_params(
        building: &str,
        floor: &str,
        sensor_type: &str,
        timeline: &str,
        aggregation: &str,
        page: Page,
    ) -> QueryResult<Self> {
        Ok(Self {
            building: parse_building_filter(building)?,
            floor: parse_floor_filter(floor)?,
            sensor_type: parse_sensor_filter(sensor_type)?,
            timeline: Timeline::parse_lenient(timeline),
            aggregation: Aggregation::parse_lenient(aggregation),
            page,
        })
    }

    /// Restrict to one building
    pub fn building(mut self, building: impl Into<String>) -> Self {
        self.building = Filter::Only(building.into());
        self
    }

    /// Restrict to one floor
    pub fn floor(mut self, floor: i64) -> Self {
        self.floor = Filter::Only(floor);
        self
    }

    /// Restrict to one sensor type
    pub fn sensor_type(mut self, sensor_type: impl Into<SensorType>) -> Self {
        self.sensor_type = Filter::Only(sensor_type.into());
        self
    }

    pub fn timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }
}
