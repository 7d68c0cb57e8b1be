use axum::extract::State;
use axum::Json;
use chrono::Utc;
use freightdesk_core::MetricsSnapshot;
use serde_json::Value;

use crate::error::ApiError;
use crate::AppState;

/// Recomputed from the files on every request so catalog edits show up
/// without a restart.
pub async fn get_metrics(State(state): State<AppState>) -> Result<Json<MetricsSnapshot>, ApiError> {
    let snapshot = state
        .with_catalog(|catalog| catalog.snapshot(Utc::now()))
        .await?;
    Ok(Json(snapshot))
}

pub async fn get_data(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let data = state
        .with_catalog(|catalog| catalog.load_raw_shipments())
        .await?;
    Ok(Json(data))
}
