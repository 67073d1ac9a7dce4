//! Reading Routes
//!
//! Manual injection of readings, alongside the synthetic feed.
//!
//! - POST /api/v1/readings - Single reading
//! - POST /api/v1/readings/batch - Batch of readings, stored atomically

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{BatchIngestResponse, BatchReadingRequest, IngestResponse, ReadingRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::blocking;
use crate::api::state::AppState;
use crate::store::format_timestamp;

/// POST /api/v1/readings
pub async fn create_reading(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReadingRequest>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    let reading = req.into_reading()?;
    let timestamp = format_timestamp(&reading.timestamp);

    let store = Arc::clone(&state.store);
    let id = blocking(move || store.insert(&reading)).await?;

    tracing::debug!(id, "Reading injected");

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            status: "ok".to_string(),
            id,
            timestamp,
        }),
    ))
}

/// POST /api/v1/readings/batch
///
/// Either every reading is stored or none is.
pub async fn create_readings_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchReadingRequest>,
) -> ApiResult<(StatusCode, Json<BatchIngestResponse>)> {
    if req.readings.is_empty() {
        return Err(ApiError::Validation("Empty batch".to_string()));
    }

    let max = state.config.max_batch_size;
    if req.readings.len() > max {
        return Err(ApiError::Validation(format!(
            "Batch size exceeds maximum of {} readings",
            max
        )));
    }

    let readings = req
        .readings
        .into_iter()
        .enumerate()
        .map(|(index, r)| {
            r.into_reading().map_err(|e| match e {
                ApiError::Validation(msg) => {
                    ApiError::Validation(format!("reading {}: {}", index, msg))
                }
                other => other,
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    let store = Arc::clone(&state.store);
    let accepted = blocking(move || store.insert_batch(&readings)).await?;

    tracing::info!(accepted, "Reading batch injected");

    Ok((
        StatusCode::CREATED,
        Json(BatchIngestResponse {
            status: "ok".to_string(),
            accepted,
        }),
    ))
}
