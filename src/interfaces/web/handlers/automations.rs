use axum::{
    Json,
    extract::{Path, State},
};

use super::super::AppState;
use super::super::error::ApiError;

pub async fn get_scheduler_jobs_endpoint(State(state): State<AppState>) -> Json<serde_json::Value> {
    let jobs = state.engine.scheduler().active_ids().await;
    Json(serde_json::json!({
        "count": jobs.len(),
        "jobs": jobs
    }))
}

/// Runs an automation's actions right away, outside its trigger.
pub async fn run_automation_endpoint(
    Path(automation_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state
        .engine
        .run_now(&automation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Automation not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "automation_id": automation_id,
        "report": report
    })))
}
