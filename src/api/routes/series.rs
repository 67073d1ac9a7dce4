//! Series Routes
//!
//! Time series and aggregated views behind the graphical and tabular
//! dashboards.
//!
//! - GET /api/v1/series/:building/:sensor_type/:timeline
//! - GET /api/v1/data/:building/:floor/:sensor_type/:timeline/:aggregation
//! - GET /api/v1/table?building_id&floor_id&sensor_type&timeline&aggregation&limit&offset

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{PageParams, SensorDataResponse, TableParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::blocking;
use crate::api::state::AppState;
use crate::query::{
    parse_building_filter, parse_floor_filter, parse_sensor_filter, AggregateRow, Aggregation,
    Filter, QueryRequest, TimeSeriesPoint, Timeline,
};
use crate::store::SensorType;

/// GET /api/v1/series/:building/:sensor_type/:timeline
///
/// Single building, single sensor type. Needs concrete values; the
/// wildcard is rejected.
pub async fn time_series(
    State(state): State<Arc<AppState>>,
    Path((building, sensor_type, timeline)): Path<(String, String, String)>,
) -> ApiResult<Json<Vec<TimeSeriesPoint>>> {
    let building = match parse_building_filter(&building)? {
        Filter::Only(b) => b,
        Filter::All => {
            return Err(ApiError::Validation(
                "A specific building is required".to_string(),
            ))
        }
    };
    let sensor_type = match parse_sensor_filter(&sensor_type)? {
        Filter::Only(t) => t,
        Filter::All => {
            return Err(ApiError::Validation(
                "A specific sensor type is required".to_string(),
            ))
        }
    };
    let timeline = Timeline::parse_lenient(&timeline);

    let engine = Arc::clone(&state.engine);
    let points =
        blocking(move || engine.query_time_series(&building, &sensor_type, timeline)).await?;

    Ok(Json(points))
}

/// GET /api/v1/data/:building/:floor/:sensor_type/:timeline/:aggregation
///
/// Digital sensors return equipment status rows; every other type is
/// bucketed and aggregated. Accepts optional `limit` and `offset`.
pub async fn sensor_data(
    State(state): State<Arc<AppState>>,
    Path((building, floor, sensor_type, timeline, aggregation)): Path<(
        String,
        String,
        String,
        String,
        String,
    )>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<SensorDataResponse>> {
    let building = parse_building_filter(&building)?;
    let floor = parse_floor_filter(&floor)?;
    let sensor_type = parse_sensor_filter(&sensor_type)?;

    let engine = Arc::clone(&state.engine);

    if matches!(sensor_type, Filter::Only(SensorType::Digital)) {
        let rows = blocking(move || engine.query_digital(&building, &floor)).await?;
        return Ok(Json(SensorDataResponse::Digital(rows)));
    }

    let request = QueryRequest {
        building,
        floor,
        sensor_type,
        timeline: Timeline::parse_lenient(&timeline),
        aggregation: Aggregation::parse_lenient(&aggregation),
        page: page.to_page()?,
    };

    let rows = blocking(move || engine.query_aggregated(&request)).await?;
    Ok(Json(SensorDataResponse::Aggregated(rows)))
}

/// GET /api/v1/table
///
/// Paginated multi-dimensional query; defaults to 30 rows from offset 0.
pub async fn table(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TableParams>,
) -> ApiResult<Json<Vec<AggregateRow>>> {
    let request = params.to_request()?;

    let engine = Arc::clone(&state.engine);
    let rows = blocking(move || engine.query_aggregated(&request)).await?;

    Ok(Json(rows))
}
