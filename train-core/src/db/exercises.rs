use rusqlite::{params, Connection, OptionalExtension, Row};

use super::history::refresh_personal_record;
use super::{enum_column, optional_enum_column, ConflictExt, Database, DbError, DbResult};
use crate::models::*;

const EXERCISE_COLUMNS: &str =
    "id, name, type, category, target_sets, target_reps, target_weight, created_at, updated_at";

const DUPLICATE_NAME: &str = "Exercise with this name already exists";

/// Upper bound on rows returned by a listing.
const LIST_LIMIT: i64 = 50;

fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: row.get(0)?,
        name: row.get(1)?,
        exercise_type: enum_column(row, 2, ExerciseType::from_str)?,
        category: optional_enum_column(row, 3, Category::from_str)?,
        target_sets: row.get(4)?,
        target_reps: row.get(5)?,
        target_weight: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(crate) fn insert_exercise(conn: &Connection, input: &CreateExerciseInput) -> DbResult<i64> {
    conn.execute(
        "INSERT INTO exercises (name, type, category, target_sets, target_reps, target_weight)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            input.name,
            input.exercise_type.as_str(),
            input.category.map(|c| c.as_str()),
            input.target_sets,
            input.target_reps,
            input.target_weight,
        ],
    )
    .or_conflict(DUPLICATE_NAME)?;
    Ok(conn.last_insert_rowid())
}

/// `LIKE` pattern matching `search` anywhere, with its own wildcards escaped.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn find_exercise(conn: &Connection, id: i64) -> DbResult<Option<Exercise>> {
    let sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], exercise_from_row).optional()?)
}

pub(crate) fn require_exercise(conn: &Connection, id: i64) -> DbResult<Exercise> {
    find_exercise(conn, id)?.ok_or_else(|| DbError::NotFound("Exercise not found".into()))
}

impl Database {
    pub fn create_exercise(&self, input: CreateExerciseInput) -> DbResult<Exercise> {
        self.with_connection(|conn| {
            let id = insert_exercise(conn, &input)?;
            tracing::debug!(id, name = %input.name, "Created exercise");
            require_exercise(conn, id)
        })
    }

    pub fn get_exercise(&self, id: i64) -> DbResult<Option<Exercise>> {
        self.with_connection(|conn| find_exercise(conn, id))
    }

    pub fn get_exercise_by_name(&self, name: &str) -> DbResult<Option<Exercise>> {
        self.with_connection(|conn| {
            let sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE name = ?1");
            Ok(conn.query_row(&sql, [name], exercise_from_row).optional()?)
        })
    }

    /// Exercises ordered by name, narrowed by whichever filters are set.
    pub fn list_exercises(&self, filter: &ExerciseFilter) -> DbResult<Vec<Exercise>> {
        self.with_connection(|conn| {
            let sql = format!(
                "SELECT {EXERCISE_COLUMNS} FROM exercises
                 WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\')
                   AND (?2 IS NULL OR type = ?2)
                   AND (?3 IS NULL OR category = ?3)
                 ORDER BY name
                 LIMIT ?4"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                params![
                    filter
                        .search
                        .as_deref()
                        .filter(|s| !s.is_empty())
                        .map(contains_pattern),
                    filter.exercise_type.map(|t| t.as_str()),
                    filter.category.map(|c| c.as_str()),
                    LIST_LIMIT,
                ],
                exercise_from_row,
            )?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    /// Apply a partial update. Changing the type re-derives the personal
    /// record, since the direction of "better" may have flipped.
    pub fn update_exercise(&self, id: i64, input: UpdateExerciseInput) -> DbResult<Exercise> {
        if input.is_empty() {
            return Err(DbError::Invalid("No fields to update".into()));
        }

        self.with_transaction(|tx| {
            let before = require_exercise(tx, id)?;

            let (set_category, category) = match input.category {
                Some(category) => (true, category.map(|c| c.as_str())),
                None => (false, None),
            };

            tx.execute(
                "UPDATE exercises SET
                    name = COALESCE(?1, name),
                    type = COALESCE(?2, type),
                    category = CASE WHEN ?3 THEN ?4 ELSE category END,
                    target_sets = COALESCE(?5, target_sets),
                    target_reps = COALESCE(?6, target_reps),
                    target_weight = COALESCE(?7, target_weight),
                    updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?8",
                params![
                    input.name,
                    input.exercise_type.map(|t| t.as_str()),
                    set_category,
                    category,
                    input.target_sets,
                    input.target_reps,
                    input.target_weight,
                    id,
                ],
            )
            .or_conflict(DUPLICATE_NAME)?;

            let after = require_exercise(tx, id)?;
            if after.exercise_type.lower_is_better() != before.exercise_type.lower_is_better() {
                refresh_personal_record(tx, id, after.exercise_type)?;
            }
            Ok(after)
        })
    }

    /// Delete an exercise together with its routines and history.
    pub fn delete_exercise(&self, id: i64) -> DbResult<()> {
        self.with_connection(|conn| {
            let deleted = conn.execute("DELETE FROM exercises WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(DbError::NotFound("Exercise not found".into()));
            }
            Ok(())
        })
    }
}
