//! Export Routes
//!
//! Full-table export for backup and analysis.
//!
//! - GET /api/v1/export/:format - csv, json or ndjson download

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::ExportFormat;
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::blocking;
use crate::api::state::AppState;
use crate::store::Reading;

/// GET /api/v1/export/:format
///
/// Export every stored reading as an attachment.
pub async fn export_data(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
) -> ApiResult<Response> {
    if !state.config.enable_export {
        return Err(ApiError::Validation(
            "Export feature is disabled".to_string(),
        ));
    }

    let format = ExportFormat::parse(&format)?;

    let engine = Arc::clone(&state.engine);
    let readings = blocking(move || engine.export_full()).await?;

    tracing::info!(
        format = format.extension(),
        readings = readings.len(),
        "Exporting readings"
    );

    let body = match format {
        ExportFormat::Csv => format_csv(&readings)?,
        ExportFormat::Json => format_json(&readings)?,
        ExportFormat::Ndjson => format_ndjson(&readings)?,
    };

    let filename = format!(
        "sensor_data_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

/// Format as CSV with a header row
fn format_csv(readings: &[Reading]) -> ApiResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for reading in readings {
        writer
            .serialize(reading)
            .map_err(|e| ApiError::Internal(format!("CSV encoding failed: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV encoding failed: {}", e)))
}

/// Format as JSON array
fn format_json(readings: &[Reading]) -> ApiResult<Vec<u8>> {
    serde_json::to_vec_pretty(readings)
        .map_err(|e| ApiError::Internal(format!("JSON encoding failed: {}", e)))
}

/// Format as newline-delimited JSON
fn format_ndjson(readings: &[Reading]) -> ApiResult<Vec<u8>> {
    let mut out = Vec::new();

    for reading in readings {
        serde_json::to_writer(&mut out, reading)
            .map_err(|e| ApiError::Internal(format!("JSON encoding failed: {}", e)))?;
        out.push(b'\n');
    }

    Ok(out)
}
