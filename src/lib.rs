//! HTTP service for Train.
//!
//! Wraps the `train-core` store in an axum router: the REST API under `/api`,
//! the legacy flat-file endpoint and static files for the browser client.

pub mod api;
pub mod config;

pub use train_core::{db, legacy, models};
