use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{created, message, parse_day, parse_id, ApiError, ApiJson, ApiResult, AppState};
use crate::models::*;

#[derive(Debug, Deserialize)]
pub struct CreateRoutineRequest {
    exercise_id: Option<i64>,
    #[serde(default)]
    day_of_week: String,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    day_of_week: String,
    #[serde(default)]
    routine_ids: Vec<i64>,
}

pub async fn week(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let days = state.db.get_week_plan()?;
    Ok(Json(json!({ "days": days })))
}

pub async fn day(State(state): State<AppState>, Path(day): Path<String>) -> ApiResult<Json<DayPlan>> {
    let day = parse_day(&day)?;
    Ok(Json(state.db.get_day_plan(day)?))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateRoutineRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Some(exercise_id) = req.exercise_id.filter(|_| !req.day_of_week.is_empty()) else {
        return Err(ApiError::bad_request("exercise_id and day_of_week are required"));
    };

    let routine = state.db.create_routine(CreateRoutineInput {
        exercise_id,
        day_of_week: parse_day(&req.day_of_week)?,
        notes: req.notes,
    })?;
    Ok(created(routine.id, "Routine created successfully"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateRoutineInput>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "routine")?;
    state.db.update_routine(id, input)?;
    Ok(message("Routine updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "routine")?;
    state.db.delete_routine(id)?;
    Ok(message("Routine deleted successfully"))
}

pub async fn reorder(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> ApiResult<Json<Value>> {
    if req.day_of_week.is_empty() || req.routine_ids.is_empty() {
        return Err(ApiError::bad_request("day_of_week and routine_ids are required"));
    }
    let day = parse_day(&req.day_of_week)?;

    state.db.reorder_routines(day, &req.routine_ids)?;
    tracing::debug!(day = day.as_str(), count = req.routine_ids.len(), "Reordered routines");
    Ok(message("Routines reordered successfully"))
}
