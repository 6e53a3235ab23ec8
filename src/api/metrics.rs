use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Days, Local, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{created, message, parse_id, ApiError, ApiJson, ApiResult, AppState};
use crate::models::*;

const DEFAULT_DASHBOARD_DAYS: u64 = 30;
const DEFAULT_ENTRY_LIMIT: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct CreateMetricTypeRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    order_index: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    metric_types: Vec<MetricOrder>,
}

/// Query values that fail to parse fall back to the default.
#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    days: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntriesParams {
    limit: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let metric_types = state.db.list_metric_types()?;
    Ok(Json(json!({ "metric_types": metric_types })))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateMetricTypeRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let (name, unit, color) = (req.name.trim(), req.unit.trim(), req.color.trim());
    if name.is_empty() || unit.is_empty() || color.is_empty() {
        return Err(ApiError::bad_request("Name, unit, and color are required"));
    }

    let metric_type = state.db.create_metric_type(CreateMetricTypeInput {
        name: name.to_string(),
        unit: unit.to_string(),
        color: color.to_string(),
        order_index: req.order_index,
    })?;
    Ok(created(metric_type.id, "Metric type created successfully"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateMetricTypeInput>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "metric type")?;
    state.db.update_metric_type(id, input)?;
    Ok(message("Metric type updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "metric type")?;
    state.db.delete_metric_type(id)?;
    Ok(message("Metric type deleted successfully"))
}

pub async fn reorder(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> ApiResult<Json<Value>> {
    if req.metric_types.is_empty() {
        return Err(ApiError::bad_request("metric_types is required"));
    }
    state.db.reorder_metric_types(&req.metric_types)?;
    Ok(message("Metric types reordered successfully"))
}

pub async fn entries(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<EntriesParams>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "metric type")?;
    let limit = params
        .limit
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_ENTRY_LIMIT);

    let entries = state.db.list_metric_entries(id, limit)?;
    Ok(Json(json!({ "entries": entries })))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> ApiResult<Json<Value>> {
    let days = params
        .days
        .and_then(|raw| raw.parse::<i64>().ok())
        .map(|days| days.max(0).unsigned_abs())
        .unwrap_or(DEFAULT_DASHBOARD_DAYS);

    let metrics = state.db.dashboard(since(Local::now().date_naive(), days))?;
    Ok(Json(json!({ "metrics": metrics })))
}

/// First date included in a window of `days` days ending today.
fn since(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_window_counts_back_from_today() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert_eq!(since(today, 30), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(since(today, 0), today);
        assert_eq!(since(today, u64::MAX), NaiveDate::MIN);
    }
}
