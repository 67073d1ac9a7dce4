//! End-to-end checks of the query engine against an in-memory store

use chrono::{NaiveDate, NaiveDateTime};
use sensorboard::query::{
    Aggregation, DistinctColumn, DistinctValue, Filter, Page, QueryEngine, QueryError,
    QueryRequest, Timeline,
};
use sensorboard::store::{NewReading, SensorType, SqliteStore};
use std::collections::HashSet;
use std::sync::Arc;

fn ts(day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, min, sec)
        .unwrap()
}

fn setup() -> (Arc<SqliteStore>, QueryEngine) {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let engine = QueryEngine::new(Arc::clone(&store));
    (store, engine)
}

fn temperature(building: &str, value: Option<f64>, at: NaiveDateTime) -> NewReading {
    NewReading::new(building, 1, SensorType::Temperature, value).at(at)
}

#[test]
fn raw_query_returns_every_row_once_newest_first() {
    let (store, engine) = setup();
    let readings: Vec<NewReading> = (0..12)
        .map(|i| temperature("1", Some(20.0 + i as f64), ts(1, 8, i * 3, 0)))
        .collect();
    store.insert_batch(&readings).unwrap();

    let rows = engine
        .query_aggregated(&QueryRequest::all().page(Page::new(100, 0).unwrap()))
        .unwrap();

    assert_eq!(rows.len(), readings.len());

    let values: HashSet<String> = rows
        .iter()
        .map(|r| format!("{:?}", r.value))
        .collect();
    assert_eq!(values.len(), readings.len());

    assert!(rows.windows(2).all(|w| w[0].period >= w[1].period));
    assert_eq!(rows[0].period, "2024-03-01 08:33:00");
}

#[test]
fn avg_matches_mean_of_non_null_values() {
    let (store, engine) = setup();
    store
        .insert_batch(&[
            temperature("1", Some(21.0), ts(2, 9, 0, 0)),
            temperature("1", None, ts(2, 9, 10, 0)),
            temperature("1", Some(24.5), ts(2, 9, 20, 0)),
            temperature("1", Some(30.0), ts(2, 10, 5, 0)),
            temperature("2", Some(99.0), ts(2, 9, 30, 0)),
            temperature("1", None, ts(2, 11, 0, 0)),
            temperature("1", None, ts(2, 11, 30, 0)),
        ])
        .unwrap();

    let rows = engine
        .query_aggregated(
            &QueryRequest::all()
                .building("1")
                .timeline(Timeline::Hourly)
                .aggregation(Aggregation::Avg),
        )
        .unwrap();

    let periods: Vec<&str> = rows.iter().map(|r| r.period.as_str()).collect();
    assert_eq!(
        periods,
        vec![
            "2024-03-02 11:00:00",
            "2024-03-02 10:00:00",
            "2024-03-02 09:00:00"
        ]
    );

    assert_eq!(rows[0].value, None);
    assert_eq!(rows[1].value, Some(30.0));
    assert_eq!(rows[2].value, Some(22.75));
}

#[test]
fn distinct_sensor_types_match_the_data() {
    let (store, engine) = setup();
    store
        .insert_batch(&[
            NewReading::new("1", 1, SensorType::Temperature, Some(21.0)),
            NewReading::new("1", 1, SensorType::Temperature, Some(22.0)),
            NewReading::new("1", 2, SensorType::Humidity, Some(40.0)),
            NewReading::new("2", 2, SensorType::from("co2"), Some(410.0)),
            NewReading::new("2", 3, SensorType::Digital, Some(1.0)),
        ])
        .unwrap();

    let types = engine.list_distinct(DistinctColumn::SensorType).unwrap();
    let expected: Vec<DistinctValue> = ["co2", "digital", "humidity", "temperature"]
        .iter()
        .map(|s| DistinctValue::Text(s.to_string()))
        .collect();
    assert_eq!(types, expected);

    let floors = engine.list_distinct(DistinctColumn::Floor).unwrap();
    assert_eq!(
        floors,
        vec![
            DistinctValue::Integer(1),
            DistinctValue::Integer(2),
            DistinctValue::Integer(3)
        ]
    );
}

#[test]
fn pages_partition_the_full_result() {
    let (store, engine) = setup();
    let readings: Vec<NewReading> = (0..25)
        .map(|i| temperature("1", Some(i as f64), ts(3, 12, i, 0)))
        .collect();
    store.insert_batch(&readings).unwrap();

    let full = engine
        .query_aggregated(&QueryRequest::all().page(Page::new(100, 0).unwrap()))
        .unwrap();
    assert_eq!(full.len(), 25);

    let mut paged = Vec::new();
    let mut sizes = Vec::new();
    for offset in [0, 10, 20] {
        let page = engine
            .query_aggregated(&QueryRequest::all().page(Page::new(10, offset).unwrap()))
            .unwrap();
        sizes.push(page.len());
        paged.extend(page);
    }

    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(paged, full);
}

#[test]
fn digital_rows_carry_status_not_values() {
    let (store, engine) = setup();
    store
        .insert_batch(&[
            NewReading::new("1", 1, SensorType::Digital, Some(1.0))
                .at(ts(4, 10, 1, 0))
                .equipment("ON", "OFF", "ON")
                .fan_id("FAN-1"),
            NewReading::new("1", 1, SensorType::Digital, Some(0.0))
                .at(ts(4, 10, 30, 0))
                .equipment("OFF", "OFF", "OFF")
                .fan_id("FAN-1"),
            temperature("1", Some(23.0), ts(4, 10, 15, 0)),
        ])
        .unwrap();

    let digital = engine
        .query_digital(&Filter::Only("1".to_string()), &Filter::All)
        .unwrap();
    assert_eq!(digital.len(), 2);
    assert_eq!(digital[0].fan_status.as_deref(), Some("OFF"));
    assert_eq!(digital[1].rotor_status.as_deref(), Some("OFF"));
    assert!(digital.iter().all(|r| r.unit == "Status"));

    let series = engine
        .query_time_series("1", &SensorType::Digital, Timeline::Hourly)
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].value, None);

    let rows = engine
        .query_aggregated(&QueryRequest::all().timeline(Timeline::Hourly))
        .unwrap();
    assert_eq!(rows.len(), 2);

    for row in rows {
        if row.sensor_type.is_digital() {
            assert_eq!(row.value, None);
            assert_eq!(row.fan_status.as_deref(), Some("OFF"));
        } else {
            assert_eq!(row.value, Some(23.0));
            assert_eq!(row.fan_status, None);
            assert_eq!(row.rotor_status, None);
            assert_eq!(row.pipe_status, None);
        }
    }
}

#[test]
fn hourly_series_averages_one_bucket() {
    let (store, engine) = setup();
    store
        .insert_batch(&[
            temperature("B", Some(20.0), ts(1, 10, 0, 10)),
            temperature("B", Some(22.0), ts(1, 10, 0, 40)),
            temperature("B", Some(24.0), ts(1, 10, 59, 59)),
        ])
        .unwrap();

    let series = engine
        .query_time_series("B", &SensorType::Temperature, Timeline::Hourly)
        .unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].timestamp, "2024-03-01 10:00:00");
    assert_eq!(series[0].value, Some(22.0));
}

#[test]
fn unknown_sensor_type_is_rejected() {
    let (store, engine) = setup();
    store
        .insert(&NewReading::new("1", 1, SensorType::Temperature, Some(21.0)))
        .unwrap();

    let series = engine.query_time_series("1", &SensorType::from("foo"), Timeline::Raw);
    assert!(matches!(series, Err(QueryError::Validation(_))));

    let rows = engine.query_aggregated(&QueryRequest::all().sensor_type("foo"));
    assert!(matches!(rows, Err(QueryError::Validation(_))));
}

#[test]
fn unmatched_filters_return_empty_results() {
    let (store, engine) = setup();
    store
        .insert(&NewReading::new("1", 1, SensorType::Humidity, Some(45.0)))
        .unwrap();

    let rows = engine
        .query_aggregated(&QueryRequest::all().building("42"))
        .unwrap();
    assert!(rows.is_empty());

    let rows = engine
        .query_aggregated(&QueryRequest::all().sensor_type(SensorType::Pressure))
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn wildcard_and_specific_filters() {
    let (store, engine) = setup();
    store
        .insert_batch(&[
            NewReading::new("1", 1, SensorType::Temperature, Some(20.0)),
            NewReading::new("1", 2, SensorType::Humidity, Some(50.0)),
            NewReading::new("2", 1, SensorType::Temperature, Some(25.0)),
            NewReading::new("2", 3, SensorType::Pressure, Some(40.0)),
        ])
        .unwrap();

    let request = QueryRequest::from_params("all", "all", "all", "raw", "raw", Page::default())
        .unwrap();
    assert_eq!(engine.query_aggregated(&request).unwrap().len(), 4);

    let request =
        QueryRequest::from_params("2", "all", "all", "raw", "raw", Page::default()).unwrap();
    let rows = engine.query_aggregated(&request).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.building.as_deref() == Some("2")));

    let request = QueryRequest::from_params(
        "all",
        "1",
        "temperature",
        "raw",
        "raw",
        Page::default(),
    )
    .unwrap();
    let rows = engine.query_aggregated(&request).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.floor == Some(1)));

    assert_eq!(
        engine.list_floors(&Filter::Only("2".to_string())).unwrap(),
        vec![1, 3]
    );
}

#[test]
fn unrecognized_timeline_and_aggregation_fall_back() {
    let request = QueryRequest::from_params(
        "all",
        "all",
        "all",
        "fortnightly",
        "median",
        Page::default(),
    )
    .unwrap();

    assert_eq!(request.timeline, Timeline::Raw);
    assert_eq!(request.aggregation, Aggregation::Avg);
    assert_eq!(request.page.limit, 30);
}
