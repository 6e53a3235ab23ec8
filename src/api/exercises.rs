use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{created, message, parse_id, ApiError, ApiJson, ApiResult, AppState};
use crate::models::*;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    search: Option<String>,
    #[serde(rename = "type")]
    exercise_type: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    exercise_type: String,
    category: Option<String>,
    target_sets: Option<i64>,
    target_reps: Option<i64>,
    target_weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExerciseRequest {
    name: Option<String>,
    #[serde(rename = "type")]
    exercise_type: Option<String>,
    /// An empty string clears the category.
    category: Option<String>,
    target_sets: Option<i64>,
    target_reps: Option<i64>,
    target_weight: Option<f64>,
}

fn parse_type(raw: &str) -> ApiResult<ExerciseType> {
    ExerciseType::from_str(raw).ok_or_else(|| {
        ApiError::bad_request("Invalid type. Must be weight, bodyweight, cardio, or assisted")
    })
}

/// Empty means "no category".
fn parse_category(raw: &str) -> ApiResult<Option<Category>> {
    if raw.is_empty() {
        return Ok(None);
    }
    Category::from_str(raw)
        .map(Some)
        .ok_or_else(|| ApiError::bad_request("Invalid category"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Value>> {
    let filter = ExerciseFilter {
        search: non_empty(params.search),
        exercise_type: non_empty(params.exercise_type)
            .map(|raw| parse_type(&raw))
            .transpose()?,
        category: match non_empty(params.category) {
            Some(raw) => parse_category(&raw)?,
            None => None,
        },
    };

    let exercises = state.db.list_exercises(&filter)?;
    Ok(Json(json!({ "exercises": exercises })))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Exercise>> {
    let id = parse_id(&id, "exercise")?;
    state
        .db
        .get_exercise(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Exercise not found"))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateExerciseRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let name = req.name.trim();
    if name.is_empty() || req.exercise_type.is_empty() {
        return Err(ApiError::bad_request("Name and type are required"));
    }

    let input = CreateExerciseInput {
        name: name.to_string(),
        exercise_type: parse_type(&req.exercise_type)?,
        category: match req.category.as_deref() {
            Some(raw) => parse_category(raw)?,
            None => None,
        },
        target_sets: req.target_sets,
        target_reps: req.target_reps,
        target_weight: req.target_weight,
    };

    let exercise = state.db.create_exercise(input)?;
    Ok(created(exercise.id, "Exercise created successfully"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateExerciseRequest>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "exercise")?;

    let name = match req.name {
        Some(name) if name.trim().is_empty() => {
            return Err(ApiError::bad_request("Name cannot be empty"));
        }
        Some(name) => Some(name.trim().to_string()),
        None => None,
    };

    let input = UpdateExerciseInput {
        name,
        exercise_type: req.exercise_type.as_deref().map(parse_type).transpose()?,
        category: req.category.as_deref().map(parse_category).transpose()?,
        target_sets: req.target_sets,
        target_reps: req.target_reps,
        target_weight: req.target_weight,
    };

    state.db.update_exercise(id, input)?;
    Ok(message("Exercise updated successfully"))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "exercise")?;
    state.db.delete_exercise(id)?;
    Ok(message("Exercise deleted successfully"))
}
