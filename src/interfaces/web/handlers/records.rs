use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::{debug, error};

use super::super::AppState;
use super::super::error::ApiError;
use crate::core::store::{Record, StoreError, Table, render_id};

fn parse_table(name: &str) -> Result<Table, ApiError> {
    Ok(name.parse::<Table>()?)
}

fn into_record(payload: Result<Json<Value>, JsonRejection>) -> Result<Record, ApiError> {
    let Json(value) = payload?;
    match value {
        Value::Object(map) if !map.is_empty() => Ok(map),
        Value::Object(_) => Err(ApiError::BadRequest(
            "Request body has no columns".to_string(),
        )),
        _ => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

/// Activity logging never fails a write that has already been committed.
async fn record_activity(state: &AppState, action: &str, table: Table, id: &str, details: &str) {
    if let Err(e) = state
        .store
        .log_activity(action, table.name(), id, details)
        .await
    {
        error!("Failed to log {} on {} {}: {}", action, table, id, e);
    }
}

async fn refresh_automation(state: &AppState, id: &str) {
    if let Err(e) = state.engine.scheduler().refresh(id).await {
        error!("Failed to refresh automation {}: {:#}", id, e);
    }
}

pub async fn list_records_endpoint(
    Path(table): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let table = parse_table(&table)?;
    Ok(Json(state.store.list_records(table).await?))
}

pub async fn get_record_endpoint(
    Path((table, id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Record>, ApiError> {
    let table = parse_table(&table)?;
    let record = state
        .store
        .get_record(table, &id)
        .await?
        .ok_or(StoreError::NotFound)?;
    Ok(Json(record))
}

pub async fn create_record_endpoint(
    Path(table): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let table = parse_table(&table)?;
    let record = into_record(payload)?;
    let details = serde_json::to_string(&record)?;

    let id = state.store.insert_record(table, &record).await?;
    record_activity(&state, "CREATE", table, &id, &details).await;

    if table == Table::Automations {
        refresh_automation(&state, &id).await;
    }

    let stored = match state.store.get_record(table, &id).await {
        Ok(Some(row)) => row,
        _ => record,
    };
    let fired = state.engine.on_record_created(table, &stored).await;
    debug!("{} automations fired for new {} record {}", fired, table, id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Record created successfully",
            "id": id
        })),
    ))
}

pub async fn update_record_endpoint(
    Path((table, id)): Path<(String, String)>,
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let table = parse_table(&table)?;
    let changes = into_record(payload)?;
    let details = serde_json::to_string(&changes)?;

    let old_record = state
        .store
        .get_record(table, &id)
        .await?
        .ok_or(StoreError::NotFound)?;

    state.store.update_record(table, &id, &changes).await?;
    record_activity(&state, "UPDATE", table, &id, &details).await;

    // The primary key itself may have been changed by this update.
    let new_id = changes
        .get(table.id_column())
        .and_then(render_id)
        .unwrap_or_else(|| id.clone());

    if table == Table::Automations {
        refresh_automation(&state, &id).await;
        if new_id != id {
            refresh_automation(&state, &new_id).await;
        }
    }

    let new_record = match state.store.get_record(table, &new_id).await {
        Ok(Some(row)) => row,
        _ => {
            let mut merged = old_record.clone();
            merged.extend(changes);
            merged
        }
    };
    let fired = state
        .engine
        .on_record_updated(table, &new_record, &old_record)
        .await;
    debug!("{} automations fired for {} update of {}", fired, table, id);

    Ok(Json(json!({ "message": "Record updated successfully" })))
}

pub async fn delete_record_endpoint(
    Path((table, id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let table = parse_table(&table)?;

    state.store.delete_record(table, &id).await?;
    record_activity(&state, "DELETE", table, &id, "").await;

    if table == Table::Automations
        && let Err(e) = state.engine.scheduler().stop(&id).await
    {
        error!("Failed to stop automation {}: {:#}", id, e);
    }

    Ok(Json(json!({ "message": "Record deleted successfully" })))
}
