//! Query plans
//!
//! Each engine operation maps to a fixed SQL template. Templates are
//! assembled only from `&'static str` fragments selected by closed enums
//! ([`Timeline`], [`Aggregation`], [`DistinctColumn`]); every value that came
//! from a caller, including limit and offset, is a bound parameter.
//!
//! Filters use the `(?n IS NULL OR column = ?n)` form so one template serves
//! both the wildcard and the specific case: binding NULL disables the filter.
//!
//! Ordering is newest first everywhere: readings by timestamp descending,
//! buckets by label descending.

use crate::query::types::{Aggregation, DistinctColumn, Filter, Page, QueryRequest, Timeline};
use crate::store::{SensorType, READING_COLUMNS};
use rusqlite::types::Value;

/// SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryPlan {
    fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Filters on ?1 (building), ?2 (floor) and ?3 (sensor type)
const DIMENSION_FILTER: &str = "(?1 IS NULL OR building_id = ?1) \
     AND (?2 IS NULL OR floor_number = ?2) \
     AND (?3 IS NULL OR sensor_type = ?3)";

fn text_param(filter: &Filter<String>) -> Value {
    filter
        .value()
        .map(|v| Value::Text(v.clone()))
        .unwrap_or(Value::Null)
}

fn floor_param(filter: &Filter<i64>) -> Value {
    filter.value().map(|v| Value::Integer(*v)).unwrap_or(Value::Null)
}

fn sensor_param(filter: &Filter<SensorType>) -> Value {
    filter
        .value()
        .map(|v| Value::Text(v.as_str().to_string()))
        .unwrap_or(Value::Null)
}

fn page_params(page: &Page) -> [Value; 2] {
    [
        Value::Integer(page.limit as i64),
        Value::Integer(page.offset as i64),
    ]
}

/// Distinct non-null values of one column, ascending
///
/// Numeric building ids sort by number, so "10" follows "9".
pub fn distinct(column: DistinctColumn) -> QueryPlan {
    let sql = match column {
        DistinctColumn::Building => {
            "SELECT DISTINCT building_id FROM sensor_data \
             WHERE building_id IS NOT NULL \
             ORDER BY CAST(building_id AS INTEGER), building_id"
        }
        DistinctColumn::Floor => {
            "SELECT DISTINCT floor_number FROM sensor_data \
             WHERE floor_number IS NOT NULL ORDER BY floor_number"
        }
        DistinctColumn::SensorType => {
            "SELECT DISTINCT sensor_type FROM sensor_data \
             WHERE sensor_type IS NOT NULL ORDER BY sensor_type"
        }
    };
    QueryPlan::new(sql, Vec::new())
}

/// Distinct floors, optionally within one building
pub fn floors(building: &Filter<String>) -> QueryPlan {
    QueryPlan::new(
        "SELECT DISTINCT floor_number FROM sensor_data \
         WHERE (?1 IS NULL OR building_id = ?1) AND floor_number IS NOT NULL \
         ORDER BY floor_number",
        vec![text_param(building)],
    )
}

/// Whether any reading carries the given sensor type
pub fn sensor_type_exists(sensor_type: &SensorType) -> QueryPlan {
    QueryPlan::new(
        "SELECT EXISTS(SELECT 1 FROM sensor_data WHERE sensor_type = ?1)",
        vec![Value::Text(sensor_type.as_str().to_string())],
    )
}

/// Reading count per sensor type
pub fn sensor_distribution() -> QueryPlan {
    QueryPlan::new(
        "SELECT sensor_type, COUNT(*) FROM sensor_data \
         GROUP BY sensor_type ORDER BY sensor_type",
        Vec::new(),
    )
}

/// Single building and sensor type: raw points or bucket averages
///
/// Digital buckets carry no value.
pub fn time_series(building: &str, sensor_type: &SensorType, timeline: Timeline) -> QueryPlan {
    let sql = if timeline.is_bucketed() {
        format!(
            "SELECT {bucket} AS period, \
             CASE WHEN ?2 = 'digital' THEN NULL ELSE AVG(value) END \
             FROM sensor_data \
             WHERE building_id = ?1 AND sensor_type = ?2 \
             GROUP BY period ORDER BY period DESC",
            bucket = timeline.bucket_expr()
        )
    } else {
        "SELECT timestamp, value FROM sensor_data \
         WHERE building_id = ?1 AND sensor_type = ?2 \
         ORDER BY timestamp DESC, id DESC"
            .to_string()
    };

    QueryPlan::new(
        sql,
        vec![
            Value::Text(building.to_string()),
            Value::Text(sensor_type.as_str().to_string()),
        ],
    )
}

/// Digital readings with their equipment status, never aggregated
pub fn digital(building: &Filter<String>, floor: &Filter<i64>) -> QueryPlan {
    QueryPlan::new(
        "SELECT building_id, floor_number, fan_status, rotor_status, pipe_status, fan_id \
         FROM sensor_data \
         WHERE sensor_type = 'digital' \
         AND (?1 IS NULL OR building_id = ?1) \
         AND (?2 IS NULL OR floor_number = ?2) \
         ORDER BY timestamp DESC, id DESC",
        vec![text_param(building), floor_param(floor)],
    )
}

/// Multi-dimensional aggregation, grouped by bucket and sensor type
///
/// Column order of the result: period, sensor_type, building, floor, value,
/// samples, status, fan_status, rotor_status, pipe_status, fan_id.
pub fn aggregated(request: &QueryRequest) -> QueryPlan {
    let sql = if request.timeline.is_bucketed() {
        bucketed_sql(request.timeline, request.aggregation)
    } else {
        raw_sql()
    };

    let [limit, offset] = page_params(&request.page);
    QueryPlan::new(
        sql,
        vec![
            text_param(&request.building),
            floor_param(&request.floor),
            sensor_param(&request.sensor_type),
            limit,
            offset,
        ],
    )
}

/// Raw timeline: every reading is its own bucket, values pass through
fn raw_sql() -> String {
    format!(
        "SELECT timestamp AS period, sensor_type, building_id, floor_number, value, 1 AS samples, \
         status, fan_status, rotor_status, pipe_status, fan_id \
         FROM sensor_data \
         WHERE {filter} \
         ORDER BY timestamp DESC, id DESC \
         LIMIT ?4 OFFSET ?5",
        filter = DIMENSION_FILTER
    )
}

/// Bucketed timeline
///
/// The status fields (and the value, for `Aggregation::Raw`) come from the
/// last-seen reading of each bucket: latest timestamp, then highest id.
/// Digital rows never carry an aggregated value.
fn bucketed_sql(timeline: Timeline, aggregation: Aggregation) -> String {
    let (agg_column, value_expr) = match aggregation.window_fn() {
        Some(window_fn) => (
            window_fn,
            "CASE WHEN sensor_type = 'digital' THEN NULL ELSE agg_value END",
        ),
        None => ("NULL", "value"),
    };

    format!(
        "WITH filtered AS ( \
             SELECT id, timestamp, {bucket} AS period, sensor_type, value, \
                    status, fan_status, rotor_status, pipe_status, fan_id \
             FROM sensor_data \
             WHERE {filter} \
         ), \
         ranked AS ( \
             SELECT *, \
                    ROW_NUMBER() OVER latest AS recency, \
                    {agg_column} AS agg_value, \
                    COUNT(*) OVER bucket AS samples \
             FROM filtered \
             WINDOW bucket AS (PARTITION BY period, sensor_type), \
                    latest AS (PARTITION BY period, sensor_type ORDER BY timestamp DESC, id DESC) \
         ) \
         SELECT period, sensor_type, NULL AS building_id, NULL AS floor_number, \
                {value_expr} AS value, samples, \
                status, fan_status, rotor_status, pipe_status, fan_id \
         FROM ranked \
         WHERE recency = 1 \
         ORDER BY period DESC, sensor_type ASC \
         LIMIT ?4 OFFSET ?5",
        bucket = timeline.bucket_expr(),
        filter = DIMENSION_FILTER,
        agg_column = agg_column,
        value_expr = value_expr,
    )
}

/// Every reading, in insertion order
pub fn export_full() -> QueryPlan {
    QueryPlan::new(
        format!("SELECT {} FROM sensor_data ORDER BY id", READING_COLUMNS),
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::Page;

    #[test]
    fn test_aggregated_binds_all_values() {
        let request = QueryRequest::all()
            .building("1'; DROP TABLE sensor_data; --")
            .floor(2)
            .sensor_type("temperature")
            .timeline(Timeline::Daily)
            .aggregation(Aggregation::Avg)
            .page(Page::new(10, 20).unwrap());

        let plan = aggregated(&request);

        assert!(!plan.sql.contains("DROP TABLE"));
        assert_eq!(
            plan.params,
            vec![
                Value::Text("1'; DROP TABLE sensor_data; --".to_string()),
                Value::Integer(2),
                Value::Text("temperature".to_string()),
                Value::Integer(10),
                Value::Integer(20),
            ]
        );
    }

    #[test]
    fn test_wildcards_bind_null() {
        let plan = aggregated(&QueryRequest::all());

        assert_eq!(plan.params[0], Value::Null);
        assert_eq!(plan.params[1], Value::Null);
        assert_eq!(plan.params[2], Value::Null);
        assert_eq!(plan.params[3], Value::Integer(30));
        assert_eq!(plan.params[4], Value::Integer(0));
    }

    #[test]
    fn test_bucketed_sql_selects_aggregate() {
        let sql = bucketed_sql(Timeline::Hourly, Aggregation::Max);
        assert!(sql.contains("MAX(value) OVER bucket"));
        assert!(sql.contains("strftime('%Y-%m-%d %H:00:00', timestamp)"));
        assert!(sql.contains("CASE WHEN sensor_type = 'digital'"));

        let sql = bucketed_sql(Timeline::Weekly, Aggregation::Raw);
        assert!(sql.contains("NULL AS agg_value"));
        assert!(!sql.contains("CASE WHEN"));
    }

    #[test]
    fn test_time_series_plans() {
        let raw = time_series("1", &SensorType::Temperature, Timeline::Raw);
        assert!(raw.sql.contains("ORDER BY timestamp DESC"));
        assert_eq!(raw.params.len(), 2);

        let daily = time_series("1", &SensorType::Temperature, Timeline::Daily);
        assert!(daily.sql.contains("AVG(value)"));
        assert!(daily.sql.contains("ORDER BY period DESC"));
        assert!(daily.sql.contains("WHEN ?2 = 'digital' THEN NULL"));
    }

    #[test]
    fn test_distinct_plans_are_static() {
        for column in [
            DistinctColumn::Building,
            DistinctColumn::Floor,
            DistinctColumn::SensorType,
        ] {
            let plan = distinct(column);
            assert!(plan.sql.contains(column.column_name()));
            assert!(plan.params.is_empty());
        }
    }
}
