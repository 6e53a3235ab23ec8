//! REST API served under `/api`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::db::Database;
use crate::models::DayOfWeek;

mod days;
mod error;
mod exercises;
mod history;
mod metric_entries;
mod metrics;
mod routines;
mod training;

pub use error::{ApiError, ApiJson, ApiResult};

use error::method_not_allowed;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// File behind `/api/training`.
    pub legacy_path: PathBuf,
    pub static_dir: PathBuf,
    training_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(db: Database, legacy_path: impl Into<PathBuf>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            legacy_path: legacy_path.into(),
            static_dir: static_dir.into(),
            training_lock: Arc::new(Mutex::new(())),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    let api = Router::new()
        .route(
            "/exercises",
            get(exercises::list)
                .post(exercises::create)
                .fallback(method_not_allowed),
        )
        .route(
            "/exercises/{id}",
            get(exercises::get)
                .put(exercises::update)
                .delete(exercises::delete)
                .fallback(method_not_allowed),
        )
        .route(
            "/routines",
            get(routines::week)
                .post(routines::create)
                .fallback(method_not_allowed),
        )
        .route(
            "/routines/reorder",
            post(routines::reorder).fallback(method_not_allowed),
        )
        // GET takes a day name, PUT and DELETE a routine id.
        .route(
            "/routines/{key}",
            get(routines::day)
                .put(routines::update)
                .delete(routines::delete)
                .fallback(method_not_allowed),
        )
        .route(
            "/history",
            post(history::create).fallback(method_not_allowed),
        )
        // GET takes an exercise id, PUT and DELETE a history entry id.
        .route(
            "/history/{id}",
            get(history::list)
                .put(history::update)
                .delete(history::delete)
                .fallback(method_not_allowed),
        )
        .route(
            "/history/{id}/pr",
            get(history::personal_record).fallback(method_not_allowed),
        )
        .route("/days", get(days::list).fallback(method_not_allowed))
        .route(
            "/days/{day}",
            get(days::get).put(days::update).fallback(method_not_allowed),
        )
        .route(
            "/metrics",
            get(metrics::list)
                .post(metrics::create)
                .fallback(method_not_allowed),
        )
        .route(
            "/metrics/dashboard",
            get(metrics::dashboard).fallback(method_not_allowed),
        )
        .route(
            "/metrics/reorder",
            post(metrics::reorder).fallback(method_not_allowed),
        )
        .route(
            "/metrics/{id}",
            put(metrics::update)
                .delete(metrics::delete)
                .fallback(method_not_allowed),
        )
        .route(
            "/metrics/{id}/entries",
            get(metrics::entries).fallback(method_not_allowed),
        )
        .route(
            "/metric-entries",
            post(metric_entries::create).fallback(method_not_allowed),
        )
        .route(
            "/metric-entries/{id}",
            put(metric_entries::update)
                .delete(metric_entries::delete)
                .fallback(method_not_allowed),
        )
        .route(
            "/training",
            get(training::load)
                .post(training::save)
                .fallback(method_not_allowed),
        );

    Router::new()
        .nest("/api", api)
        .fallback_service(static_files)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

fn created(id: i64, text: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({ "id": id, "message": text })))
}

fn parse_id(raw: &str, what: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {what} ID")))
}

fn parse_day(raw: &str) -> ApiResult<DayOfWeek> {
    DayOfWeek::from_str(raw).ok_or_else(|| ApiError::bad_request("Invalid day of week"))
}

fn parse_date(raw: &str, field: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("Invalid {field}, expected YYYY-MM-DD")))
}
