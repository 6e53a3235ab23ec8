use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{message, parse_day, ApiJson, ApiResult, AppState};
use crate::models::DayTitle;

#[derive(Debug, Deserialize)]
pub struct SetTitleRequest {
    #[serde(default)]
    title: String,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let days = state.db.list_day_titles()?;
    Ok(Json(json!({ "days": days })))
}

pub async fn get(State(state): State<AppState>, Path(day): Path<String>) -> ApiResult<Json<DayTitle>> {
    let day = parse_day(&day)?;
    Ok(Json(state.db.get_day_title(day)?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(day): Path<String>,
    ApiJson(req): ApiJson<SetTitleRequest>,
) -> ApiResult<Json<Value>> {
    let day = parse_day(&day)?;
    state.db.set_day_title(day, req.title.trim())?;
    Ok(message("Day title updated successfully"))
}
