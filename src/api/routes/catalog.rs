//! Catalog Routes
//!
//! What the dashboards offer in their dropdowns.
//!
//! - GET /api/v1/buildings
//! - GET /api/v1/floors/:building
//! - GET /api/v1/sensor-types
//! - GET /api/v1/sensor-distribution

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::blocking;
use crate::api::state::AppState;
use crate::query::{parse_building_filter, DistinctColumn, DistinctValue, SensorCount};

/// GET /api/v1/buildings
///
/// Returns 404 while the store holds no readings at all.
pub async fn list_buildings(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DistinctValue>>> {
    let engine = Arc::clone(&state.engine);
    let buildings = blocking(move || engine.list_distinct(DistinctColumn::Building)).await?;

    if buildings.is_empty() {
        return Err(ApiError::NotFound("No buildings found".to_string()));
    }

    Ok(Json(buildings))
}

/// GET /api/v1/floors/:building
///
/// `all` lists floors across every building.
pub async fn list_floors(
    State(state): State<Arc<AppState>>,
    Path(building): Path<String>,
) -> ApiResult<Json<Vec<i64>>> {
    let filter = parse_building_filter(&building)?;

    let engine = Arc::clone(&state.engine);
    let floors = blocking(move || engine.list_floors(&filter)).await?;

    Ok(Json(floors))
}

/// GET /api/v1/sensor-types
pub async fn list_sensor_types(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DistinctValue>>> {
    let engine = Arc::clone(&state.engine);
    let types = blocking(move || engine.list_distinct(DistinctColumn::SensorType)).await?;

    Ok(Json(types))
}

/// GET /api/v1/sensor-distribution
pub async fn sensor_distribution(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SensorCount>>> {
    let engine = Arc::clone(&state.engine);
    let counts = blocking(move || engine.sensor_distribution()).await?;

    Ok(Json(counts))
}
