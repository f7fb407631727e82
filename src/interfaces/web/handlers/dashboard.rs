use axum::{Json, extract::State};

use super::super::AppState;
use super::super::error::ApiError;
use crate::core::store::types::DashboardStats;

pub async fn dashboard_stats_endpoint(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.store.dashboard_stats().await?))
}

pub async fn health_endpoint() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
