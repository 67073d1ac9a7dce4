//! Query Engine
//!
//! Runs query plans against the reading store and normalizes the rows:
//!
//! ```text
//! Request → Validate → Plan → Execute (one statement) → Round → Rows
//! ```
//!
//! The engine keeps no state besides its store handle. Every call opens its
//! own connection, so any number of calls may run at once on blocking
//! threads. Calls are synchronous; async callers should go through
//! `tokio::task::spawn_blocking`.

use crate::query::error::{QueryError, QueryResult};
use crate::query::plan::{self, QueryPlan};
use crate::query::rows::{
    round_opt, AggregateRow, DigitalRow, DistinctValue, SensorCount, TimeSeriesPoint,
};
use crate::query::types::{DistinctColumn, Filter, QueryRequest, Timeline};
use crate::store::{reading_from_row, Reading, SensorType, SqliteStore};
use rusqlite::{params_from_iter, types::Value, Connection, Row};
use std::sync::Arc;
use std::time::Instant;

/// Stateless, read-only query engine over the reading store
pub struct QueryEngine {
    store: Arc<SqliteStore>,
}

impl QueryEngine {
    /// Create an engine reading from the given store
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Distinct non-null values of a column, ascending
    pub fn list_distinct(&self, column: DistinctColumn) -> QueryResult<Vec<DistinctValue>> {
        let conn = self.store.connect()?;
        let values = fetch(&conn, &plan::distinct(column), "list_distinct", |row| {
            row.get::<_, Value>(0)
        })?;

        Ok(values
            .into_iter()
            .filter_map(|v| match v {
                Value::Integer(i) => Some(DistinctValue::Integer(i)),
                Value::Text(s) => Some(DistinctValue::Text(s)),
                Value::Real(f) => Some(DistinctValue::Text(f.to_string())),
                Value::Null | Value::Blob(_) => None,
            })
            .collect())
    }

    /// Distinct floors, optionally within one building
    pub fn list_floors(&self, building: &Filter<String>) -> QueryResult<Vec<i64>> {
        let conn = self.store.connect()?;
        fetch(&conn, &plan::floors(building), "list_floors", |row| row.get(0))
    }

    /// Number of readings per sensor type
    pub fn sensor_distribution(&self) -> QueryResult<Vec<SensorCount>> {
        let conn = self.store.connect()?;
        fetch(&conn, &plan::sensor_distribution(), "sensor_distribution", |row| {
            Ok(SensorCount {
                sensor_type: SensorType::from(row.get::<_, String>(0)?),
                count: row.get(1)?,
            })
        })
    }

    /// Time series for one building and sensor type
    ///
    /// Raw timeline returns every reading; bucketed timelines return the
    /// average value of each bucket, null for digital buckets. Newest first.
    pub fn query_time_series(
        &self,
        building: &str,
        sensor_type: &SensorType,
        timeline: Timeline,
    ) -> QueryResult<Vec<TimeSeriesPoint>> {
        let building = building.trim();
        if building.is_empty() {
            return Err(QueryError::Validation(
                "building cannot be empty".to_string(),
            ));
        }

        let conn = self.store.connect()?;
        check_sensor_type(&conn, sensor_type)?;

        let plan = plan::time_series(building, sensor_type, timeline);
        fetch(&conn, &plan, "query_time_series", |row| {
            Ok(TimeSeriesPoint {
                timestamp: row.get(0)?,
                value: round_opt(row.get(1)?),
            })
        })
    }

    /// Equipment status of digital readings; never aggregated
    pub fn query_digital(
        &self,
        building: &Filter<String>,
        floor: &Filter<i64>,
    ) -> QueryResult<Vec<DigitalRow>> {
        let conn = self.store.connect()?;
        let unit = SensorType::Digital.unit();

        fetch(&conn, &plan::digital(building, floor), "query_digital", |row| {
            Ok(DigitalRow {
                building: row.get(0)?,
                floor: row.get(1)?,
                fan_status: row.get(2)?,
                rotor_status: row.get(3)?,
                pipe_status: row.get(4)?,
                fan_id: row.get(5)?,
                unit: unit.to_string(),
            })
        })
    }

    /// Multi-dimensional query: filter, bucket by timeline and sensor type,
    /// aggregate, paginate
    pub fn query_aggregated(&self, request: &QueryRequest) -> QueryResult<Vec<AggregateRow>> {
        let conn = self.store.connect()?;
        if let Filter::Only(sensor_type) = &request.sensor_type {
            check_sensor_type(&conn, sensor_type)?;
        }

        tracing::debug!(
            timeline = %request.timeline,
            aggregation = %request.aggregation,
            limit = request.page.limit,
            offset = request.page.offset,
            "Running aggregated query"
        );

        fetch(&conn, &plan::aggregated(request), "query_aggregated", |row| {
            let sensor_type = SensorType::from(row.get::<_, String>(1)?);
            let unit = sensor_type.unit().to_string();
            Ok(AggregateRow {
                period: row.get(0)?,
                sensor_type,
                building: row.get(2)?,
                floor: row.get(3)?,
                value: round_opt(row.get(4)?),
                samples: row.get(5)?,
                status: row.get(6)?,
                fan_status: row.get(7)?,
                rotor_status: row.get(8)?,
                pipe_status: row.get(9)?,
                fan_id: row.get(10)?,
                unit,
            })
        })
    }

    /// Every stored reading, unfiltered and unpaginated, in insertion order
    ///
    /// Materializes the whole table.
    pub fn export_full(&self) -> QueryResult<Vec<Reading>> {
        let conn = self.store.connect()?;
        fetch(&conn, &plan::export_full(), "export_full", reading_from_row)
    }
}

/// Reject sensor types that are neither built in nor present in the store
fn check_sensor_type(conn: &Connection, sensor_type: &SensorType) -> QueryResult<()> {
    if sensor_type.is_builtin() {
        return Ok(());
    }

    let plan = plan::sensor_type_exists(sensor_type);
    let exists: bool = conn.query_row(&plan.sql, params_from_iter(plan.params.iter()), |row| {
        row.get(0)
    })?;

    if exists {
        Ok(())
    } else {
        Err(QueryError::Validation(format!(
            "Unknown sensor type: {}",
            sensor_type
        )))
    }
}

/// Run a plan as a single statement and map every row
fn fetch<T, F>(conn: &Connection, plan: &QueryPlan, operation: &str, map: F) -> QueryResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let start = Instant::now();

    let mut stmt = conn.prepare(&plan.sql)?;
    let rows = stmt
        .query_map(params_from_iter(plan.params.iter()), map)?
        .collect::<rusqlite::Result<Vec<T>>>()?;

    tracing::debug!(
        operation,
        rows = rows.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Query executed"
    );

    Ok(rows)
}
