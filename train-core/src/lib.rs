//! Core library for Train.
//!
//! This crate provides the domain models, the SQLite store and the legacy
//! plan import, independent of the HTTP layer.
//!
//! # Usage
//!
//! ```no_run
//! use train_core::db::Database;
//! use train_core::models::*;
//!
//! let db = Database::open("train.db")?;
//! db.migrate()?;
//!
//! let monday = db.get_day_plan(DayOfWeek::Monday)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod legacy;
pub mod models;

// Re-export commonly used types at crate root
pub use db::{Database, DbError, DbResult};
