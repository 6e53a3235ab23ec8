use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::{created, message, parse_date, parse_id, ApiError, ApiJson, ApiResult, AppState};
use crate::models::*;

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    metric_type_id: Option<i64>,
    #[serde(default)]
    entry_date: String,
    value: Option<f64>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    value: Option<f64>,
    entry_date: Option<String>,
    notes: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateEntryRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let (Some(metric_type_id), Some(value)) = (req.metric_type_id, req.value) else {
        return Err(ApiError::bad_request(
            "Metric type ID, entry date, and value are required",
        ));
    };
    if req.entry_date.is_empty() {
        return Err(ApiError::bad_request(
            "Metric type ID, entry date, and value are required",
        ));
    }

    let entry = state.db.create_metric_entry(CreateMetricEntryInput {
        metric_type_id,
        entry_date: parse_date(&req.entry_date, "entry_date")?,
        value,
        notes: req.notes,
    })?;
    Ok(created(entry.id, "Metric entry created successfully"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateEntryRequest>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "entry")?;
    let input = UpdateMetricEntryInput {
        value: req.value,
        entry_date: req
            .entry_date
            .as_deref()
            .map(|raw| parse_date(raw, "entry_date"))
            .transpose()?,
        notes: req.notes,
    };

    state.db.update_metric_entry(id, input)?;
    Ok(message("Metric entry updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "entry")?;
    state.db.delete_metric_entry(id)?;
    Ok(message("Metric entry deleted successfully"))
}
