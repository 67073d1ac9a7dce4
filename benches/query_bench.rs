//! Benchmarks for the sensorboard query engine
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sensorboard::ingest::ReadingGenerator;
use sensorboard::query::{Aggregation, Filter, Page, QueryEngine, QueryRequest, Timeline};
use sensorboard::store::{NewReading, SensorType, SqliteStore, StoreConfig};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

/// Seeded readings spaced one minute apart from 2024-01-01
fn seeded_readings(count: usize) -> Vec<NewReading> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut generator = ReadingGenerator::with_seed(42, 10, 5);

    generator
        .batch(count)
        .into_iter()
        .enumerate()
        .map(|(i, reading)| reading.at(start + Duration::minutes(i as i64)))
        .collect()
}

fn seeded_engine(count: usize) -> (TempDir, QueryEngine) {
    let dir = tempdir().unwrap();
    let config = StoreConfig {
        db_path: dir.path().join("bench.db").to_string_lossy().into_owned(),
        ..StoreConfig::default()
    };
    let store = Arc::new(SqliteStore::with_config(&config).unwrap());
    store.insert_batch(&seeded_readings(count)).unwrap();

    (dir, QueryEngine::new(store))
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [100, 1000] {
        let readings = seeded_readings(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("batch_{}", size), |b| {
            let dir = tempdir().unwrap();
            let store = SqliteStore::open(dir.path().join("bench.db")).unwrap();
            b.iter(|| store.insert_batch(black_box(&readings)).unwrap())
        });
    }

    group.finish();
}

fn bench_aggregated(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregated");
    let (_dir, engine) = seeded_engine(20_000);
    let page = Page::new(1000, 0).unwrap();

    for timeline in [Timeline::Raw, Timeline::Hourly, Timeline::Daily, Timeline::Weekly] {
        let request = QueryRequest::all()
            .timeline(timeline)
            .aggregation(Aggregation::Avg)
            .page(page);

        group.bench_function(format!("avg_{}", timeline), |b| {
            b.iter(|| engine.query_aggregated(black_box(&request)).unwrap())
        });
    }

    let filtered = QueryRequest::all()
        .building("3")
        .floor(2)
        .sensor_type(SensorType::Temperature)
        .timeline(Timeline::Hourly)
        .aggregation(Aggregation::Max)
        .page(page);

    group.bench_function("max_hourly_filtered", |b| {
        b.iter(|| engine.query_aggregated(black_box(&filtered)).unwrap())
    });

    group.finish();
}

fn bench_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("series");
    let (_dir, engine) = seeded_engine(20_000);

    for timeline in [Timeline::Raw, Timeline::Hourly, Timeline::Daily] {
        group.bench_function(format!("temperature_{}", timeline), |b| {
            b.iter(|| {
                engine
                    .query_time_series(black_box("1"), &SensorType::Temperature, timeline)
                    .unwrap()
            })
        });
    }

    group.bench_function("digital_all", |b| {
        b.iter(|| engine.query_digital(&Filter::All, &Filter::All).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_aggregated, bench_series);
criterion_main!(benches);
