//! The legacy whole-plan endpoint. Reads and writes the JSON file directly.

use std::io::ErrorKind;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use super::{message, ApiError, ApiJson, ApiResult, AppState};

pub async fn load(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let _guard = state.training_lock.lock().await;

    match tokio::fs::read_to_string(&state.legacy_path).await {
        Ok(contents) => Ok(([(header::CONTENT_TYPE, "application/json")], contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(ApiError::not_found("Training data not found"))
        }
        Err(err) => Err(ApiError::internal(format!("Failed to read training data: {err}"))),
    }
}

pub async fn save(
    State(state): State<AppState>,
    ApiJson(plan): ApiJson<Value>,
) -> ApiResult<Json<Value>> {
    if !plan.is_object() {
        return Err(ApiError::bad_request("Training data must be a JSON object"));
    }
    let contents = serde_json::to_string_pretty(&plan).map_err(ApiError::internal)?;

    let _guard = state.training_lock.lock().await;
    tokio::fs::write(&state.legacy_path, contents)
        .await
        .map_err(|err| ApiError::internal(format!("Failed to write training data: {err}")))?;

    tracing::debug!(path = %state.legacy_path.display(), "Saved training data");
    Ok(message("Training data saved successfully"))
}
