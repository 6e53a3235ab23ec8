use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, ErrorCode, Row, Transaction};
use thiserror::Error;

mod days;
mod exercises;
mod history;
mod metrics;
mod routines;
pub mod schema;

pub(crate) use days::upsert_day_title;
pub(crate) use exercises::insert_exercise;
pub(crate) use history::insert_history;
pub(crate) use routines::insert_routine;

#[derive(Debug, Error)]
pub enum DbError {
    /// A UNIQUE or PRIMARY KEY constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Invalid(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Shared handle to the SQLite store. Clones share one connection; the mutex
/// serializes every statement issued through it.
#[derive(Debug, Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn)
    }

    pub fn open_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create missing tables and indexes, then seed the default metric types
    /// into an empty store.
    pub fn migrate(&self) -> DbResult<()> {
        self.with_transaction(|tx| {
            tx.execute_batch(schema::SCHEMA)?;
            seed_default_metric_types(tx)
        })
    }

    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` inside a transaction. Any error rolls every statement back.
    pub fn with_transaction<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> DbResult<T>,
    ) -> DbResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn seed_default_metric_types(conn: &Connection) -> DbResult<()> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM metric_types", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(());
    }

    for (index, (name, unit, color)) in schema::DEFAULT_METRIC_TYPES.iter().enumerate() {
        conn.execute(
            "INSERT INTO metric_types (name, unit, color, order_index, is_default)
             VALUES (?1, ?2, ?3, ?4, 1)",
            params![name, unit, color, index as i64],
        )?;
    }
    tracing::debug!(
        count = schema::DEFAULT_METRIC_TYPES.len(),
        "Seeded default metric types"
    );
    Ok(())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

/// Turns uniqueness violations into [`DbError::Conflict`] with a readable
/// message; every other SQLite failure passes through untouched.
pub(crate) trait ConflictExt<T> {
    fn or_conflict(self, message: &str) -> DbResult<T>;
}

impl<T> ConflictExt<T> for rusqlite::Result<T> {
    fn or_conflict(self, message: &str) -> DbResult<T> {
        self.map_err(|err| {
            if is_unique_violation(&err) {
                DbError::Conflict(message.to_string())
            } else {
                DbError::Sqlite(err)
            }
        })
    }
}

/// Read a TEXT column holding one of the fixed enumerations.
pub(crate) fn enum_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unexpected value {raw:?}").into(),
        )
    })
}

pub(crate) fn optional_enum_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        None => Ok(None),
        Some(raw) => parse(&raw).map(Some).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Text,
                format!("unexpected value {raw:?}").into(),
            )
        }),
    }
}
