use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{message, parse_date, parse_id, ApiError, ApiJson, ApiResult, AppState};
use crate::models::*;

#[derive(Debug, Deserialize)]
pub struct CreateHistoryRequest {
    exercise_id: Option<i64>,
    #[serde(default)]
    session_date: String,
    #[serde(default)]
    sets_completed: Vec<u32>,
    weight: Option<f64>,
    #[serde(default)]
    completed: bool,
    volume: Option<f64>,
    notes: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Path(exercise_id): Path<String>,
) -> ApiResult<Json<ExerciseHistory>> {
    let exercise_id = parse_id(&exercise_id, "exercise")?;
    Ok(Json(state.db.list_history(exercise_id)?))
}

pub async fn personal_record(
    State(state): State<AppState>,
    Path(exercise_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let exercise_id = parse_id(&exercise_id, "exercise")?;
    let pr = state.db.get_personal_record(exercise_id)?;
    Ok(Json(json!({ "pr": pr })))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateHistoryRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let exercise_id = match req.exercise_id {
        Some(id) if !req.session_date.is_empty() && !req.sets_completed.is_empty() => id,
        _ => {
            return Err(ApiError::bad_request(
                "exercise_id, session_date, and sets_completed are required",
            ))
        }
    };

    let recorded = state.db.record_history(CreateHistoryInput {
        exercise_id,
        session_date: parse_date(&req.session_date, "session_date")?,
        weight: req.weight,
        sets_completed: req.sets_completed,
        completed: req.completed,
        volume: req.volume,
        notes: req.notes,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": recorded.id,
            "is_pr": recorded.is_pr,
            "message": "History entry created successfully",
        })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateHistoryInput>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "history")?;
    state.db.update_history(id, input)?;
    Ok(message("History entry updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "history")?;
    state.db.delete_history(id)?;
    Ok(message("History entry deleted successfully"))
}
