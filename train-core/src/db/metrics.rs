use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ConflictExt, Database, DbError, DbResult};
use crate::models::*;

const DUPLICATE_METRIC: &str = "Metric type with this name already exists";

const METRIC_TYPE_COLUMNS: &str = "id, name, unit, color, order_index, is_default, created_at";
const METRIC_ENTRY_COLUMNS: &str = "id, metric_type_id, entry_date, value, notes, created_at";

fn metric_type_from_row(row: &Row<'_>) -> rusqlite::Result<MetricType> {
    Ok(MetricType {
        id: row.get(0)?,
        name: row.get(1)?,
        unit: row.get(2)?,
        color: row.get(3)?,
        order_index: row.get(4)?,
        is_default: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn metric_entry_from_row(row: &Row<'_>) -> rusqlite::Result<MetricEntry> {
    Ok(MetricEntry {
        id: row.get(0)?,
        metric_type_id: row.get(1)?,
        entry_date: row.get(2)?,
        value: row.get(3)?,
        notes: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn all_metric_types(conn: &Connection) -> DbResult<Vec<MetricType>> {
    let sql = format!("SELECT {METRIC_TYPE_COLUMNS} FROM metric_types ORDER BY order_index, id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], metric_type_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn find_metric_type(conn: &Connection, id: i64) -> DbResult<Option<MetricType>> {
    let sql = format!("SELECT {METRIC_TYPE_COLUMNS} FROM metric_types WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], metric_type_from_row).optional()?)
}

fn require_metric_type(conn: &Connection, id: i64) -> DbResult<MetricType> {
    find_metric_type(conn, id)?.ok_or_else(|| DbError::NotFound("Metric type not found".into()))
}

fn latest_point(conn: &Connection, metric_type_id: i64) -> DbResult<Option<MetricPoint>> {
    Ok(conn
        .query_row(
            "SELECT entry_date, value FROM metric_entries
             WHERE metric_type_id = ?1
             ORDER BY entry_date DESC, id DESC
             LIMIT 1",
            [metric_type_id],
            |row| {
                Ok(MetricPoint {
                    date: row.get(0)?,
                    value: row.get(1)?,
                })
            },
        )
        .optional()?)
}

fn find_metric_entry(conn: &Connection, id: i64) -> DbResult<Option<MetricEntry>> {
    let sql = format!("SELECT {METRIC_ENTRY_COLUMNS} FROM metric_entries WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], metric_entry_from_row).optional()?)
}

impl Database {
    pub fn create_metric_type(&self, input: CreateMetricTypeInput) -> DbResult<MetricType> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO metric_types (name, unit, color, order_index, is_default)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                params![input.name, input.unit, input.color, input.order_index],
            )
            .or_conflict(DUPLICATE_METRIC)?;
            require_metric_type(conn, conn.last_insert_rowid())
        })
    }

    /// Every metric type in display order, each with its most recent entry.
    pub fn list_metric_types(&self) -> DbResult<Vec<MetricTypeSummary>> {
        self.with_connection(|conn| {
            all_metric_types(conn)?
                .into_iter()
                .map(|metric_type| {
                    let latest_entry = latest_point(conn, metric_type.id)?;
                    Ok(MetricTypeSummary {
                        metric_type,
                        latest_entry,
                    })
                })
                .collect()
        })
    }

    pub fn update_metric_type(&self, id: i64, input: UpdateMetricTypeInput) -> DbResult<MetricType> {
        self.with_connection(|conn| {
            let updated = conn
                .execute(
                    "UPDATE metric_types SET
                        name = COALESCE(?1, name),
                        unit = COALESCE(?2, unit),
                        color = COALESCE(?3, color),
                        order_index = COALESCE(?4, order_index),
                        updated_at = CURRENT_TIMESTAMP
                     WHERE id = ?5",
                    params![input.name, input.unit, input.color, input.order_index, id],
                )
                .or_conflict(DUPLICATE_METRIC)?;
            if updated == 0 {
                return Err(DbError::NotFound("Metric type not found".into()));
            }
            require_metric_type(conn, id)
        })
    }

    /// Delete a user-defined metric type and all of its entries. The seeded
    /// default types stay.
    pub fn delete_metric_type(&self, id: i64) -> DbResult<()> {
        self.with_connection(|conn| {
            let metric_type = require_metric_type(conn, id)?;
            if metric_type.is_default {
                return Err(DbError::Invalid("Default metric types cannot be deleted".into()));
            }
            conn.execute("DELETE FROM metric_types WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn reorder_metric_types(&self, order: &[MetricOrder]) -> DbResult<()> {
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(
                "UPDATE metric_types SET order_index = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            )?;
            for item in order {
                if stmt.execute(params![item.order_index, item.id])? == 0 {
                    return Err(DbError::NotFound(format!("Metric type {} not found", item.id)));
                }
            }
            Ok(())
        })
    }

    pub fn create_metric_entry(&self, input: CreateMetricEntryInput) -> DbResult<MetricEntry> {
        self.with_connection(|conn| {
            require_metric_type(conn, input.metric_type_id)?;
            conn.execute(
                "INSERT INTO metric_entries (metric_type_id, entry_date, value, notes)
                 VALUES (?1, ?2, ?3, ?4)",
                params![input.metric_type_id, input.entry_date, input.value, input.notes],
            )?;
            find_metric_entry(conn, conn.last_insert_rowid())?
                .ok_or_else(|| DbError::NotFound("Metric entry not found".into()))
        })
    }

    /// Newest entries first. A `limit` of zero or less returns everything.
    pub fn list_metric_entries(&self, metric_type_id: i64, limit: i64) -> DbResult<Vec<MetricEntry>> {
        self.with_connection(|conn| {
            require_metric_type(conn, metric_type_id)?;
            let sql = format!(
                "SELECT {METRIC_ENTRY_COLUMNS} FROM metric_entries
                 WHERE metric_type_id = ?1
                 ORDER BY entry_date DESC, id DESC
                 LIMIT ?2"
            );
            // SQLite treats a negative LIMIT as no limit at all.
            let limit = if limit > 0 { limit } else { -1 };
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![metric_type_id, limit], metric_entry_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    /// Every metric type with the points recorded on or after `since`,
    /// newest first. Types without points get an empty series.
    pub fn dashboard(&self, since: NaiveDate) -> DbResult<Vec<DashboardMetric>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT metric_type_id, entry_date, value FROM metric_entries
                 WHERE entry_date >= ?1
                 ORDER BY entry_date DESC, id DESC",
            )?;
            let mut series: HashMap<i64, Vec<MetricPoint>> = HashMap::new();
            let rows = stmt.query_map([since], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    MetricPoint {
                        date: row.get(1)?,
                        value: row.get(2)?,
                    },
                ))
            })?;
            for row in rows {
                let (metric_type_id, point) = row?;
                series.entry(metric_type_id).or_default().push(point);
            }

            Ok(all_metric_types(conn)?
                .into_iter()
                .map(|metric_type| DashboardMetric {
                    entries: series.remove(&metric_type.id).unwrap_or_default(),
                    id: metric_type.id,
                    name: metric_type.name,
                    unit: metric_type.unit,
                    color: metric_type.color,
                })
                .collect())
        })
    }

    pub fn update_metric_entry(&self, id: i64, input: UpdateMetricEntryInput) -> DbResult<MetricEntry> {
        self.with_connection(|conn| {
            let updated = conn.execute(
                "UPDATE metric_entries SET
                    value = COALESCE(?1, value),
                    entry_date = COALESCE(?2, entry_date),
                    notes = COALESCE(?3, notes)
                 WHERE id = ?4",
                params![input.value, input.entry_date, input.notes, id],
            )?;
            if updated == 0 {
                return Err(DbError::NotFound("Metric entry not found".into()));
            }
            find_metric_entry(conn, id)?
                .ok_or_else(|| DbError::NotFound("Metric entry not found".into()))
        })
    }

    pub fn delete_metric_entry(&self, id: i64) -> DbResult<()> {
        self.with_connection(|conn| {
            let deleted = conn.execute("DELETE FROM metric_entries WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(DbError::NotFound("Metric entry not found".into()));
            }
            Ok(())
        })
    }
}
