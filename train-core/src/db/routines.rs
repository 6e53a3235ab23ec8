use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::days::day_title;
use super::exercises::require_exercise;
use super::{enum_column, optional_enum_column, ConflictExt, Database, DbError, DbResult};
use crate::models::*;

const ORDER_TAKEN: &str = "Another routine already occupies that position";

fn routine_from_row(row: &Row<'_>) -> rusqlite::Result<Routine> {
    Ok(Routine {
        id: row.get(0)?,
        exercise_id: row.get(1)?,
        day_of_week: enum_column(row, 2, DayOfWeek::from_str)?,
        order_index: row.get(3)?,
        notes: row.get(4)?,
    })
}

fn scheduled_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduledExercise> {
    Ok(ScheduledExercise {
        routine_id: row.get(0)?,
        exercise_id: row.get(1)?,
        order_index: row.get(2)?,
        name: row.get(3)?,
        exercise_type: enum_column(row, 4, ExerciseType::from_str)?,
        category: optional_enum_column(row, 5, Category::from_str)?,
        target_sets: row.get(6)?,
        target_reps: row.get(7)?,
        target_weight: row.get(8)?,
        notes: row.get(9)?,
        last_done: row.get(10)?,
    })
}

pub(crate) fn insert_routine(
    conn: &Connection,
    exercise_id: i64,
    day: DayOfWeek,
    order_index: i64,
    notes: Option<&str>,
) -> DbResult<i64> {
    conn.execute(
        "INSERT INTO routines (exercise_id, day_of_week, order_index, notes)
         VALUES (?1, ?2, ?3, ?4)",
        params![exercise_id, day.as_str(), order_index, notes],
    )
    .or_conflict(ORDER_TAKEN)?;
    Ok(conn.last_insert_rowid())
}

fn find_routine(conn: &Connection, id: i64) -> DbResult<Option<Routine>> {
    Ok(conn
        .query_row(
            "SELECT id, exercise_id, day_of_week, order_index, notes FROM routines WHERE id = ?1",
            [id],
            routine_from_row,
        )
        .optional()?)
}

fn require_routine(conn: &Connection, id: i64) -> DbResult<Routine> {
    find_routine(conn, id)?.ok_or_else(|| DbError::NotFound("Routine not found".into()))
}

fn day_plan(conn: &Connection, day: DayOfWeek) -> DbResult<DayPlan> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.exercise_id, r.order_index,
                e.name, e.type, e.category, e.target_sets, e.target_reps, e.target_weight,
                r.notes,
                (SELECT MAX(h.session_date) FROM history h WHERE h.exercise_id = e.id)
         FROM routines r
         JOIN exercises e ON e.id = r.exercise_id
         WHERE r.day_of_week = ?1
         ORDER BY r.order_index",
    )?;
    let exercises = stmt
        .query_map([day.as_str()], scheduled_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DayPlan {
        day,
        title: day_title(conn, day)?,
        exercises,
    })
}

impl Database {
    /// Schedule an exercise at the end of a day's list.
    pub fn create_routine(&self, input: CreateRoutineInput) -> DbResult<Routine> {
        self.with_transaction(|tx| {
            require_exercise(tx, input.exercise_id)?;

            let next_index: i64 = tx.query_row(
                "SELECT COALESCE(MAX(order_index), -1) + 1 FROM routines WHERE day_of_week = ?1",
                [input.day_of_week.as_str()],
                |row| row.get(0),
            )?;
            let id = insert_routine(
                tx,
                input.exercise_id,
                input.day_of_week,
                next_index,
                input.notes.as_deref(),
            )?;
            require_routine(tx, id)
        })
    }

    pub fn get_routine(&self, id: i64) -> DbResult<Option<Routine>> {
        self.with_connection(|conn| find_routine(conn, id))
    }

    pub fn get_day_plan(&self, day: DayOfWeek) -> DbResult<DayPlan> {
        self.with_connection(|conn| day_plan(conn, day))
    }

    pub fn get_week_plan(&self) -> DbResult<Vec<DayPlan>> {
        self.with_connection(|conn| {
            DayOfWeek::ALL
                .into_iter()
                .map(|day| day_plan(conn, day))
                .collect()
        })
    }

    pub fn update_routine(&self, id: i64, input: UpdateRoutineInput) -> DbResult<Routine> {
        if input.order_index.is_some_and(|index| index < 0) {
            return Err(DbError::Invalid("order_index must not be negative".into()));
        }

        self.with_connection(|conn| {
            require_routine(conn, id)?;
            if !input.is_empty() {
                conn.execute(
                    "UPDATE routines SET
                        order_index = COALESCE(?1, order_index),
                        notes = COALESCE(?2, notes)
                     WHERE id = ?3",
                    params![input.order_index, input.notes, id],
                )
                .or_conflict(ORDER_TAKEN)?;
            }
            require_routine(conn, id)
        })
    }

    pub fn delete_routine(&self, id: i64) -> DbResult<()> {
        self.with_connection(|conn| {
            let deleted = conn.execute("DELETE FROM routines WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(DbError::NotFound("Routine not found".into()));
            }
            Ok(())
        })
    }

    /// Give `routine_ids` the order indices 0..n on `day`, all or nothing.
    ///
    /// Every row is first parked on a negative index so that swapping two
    /// positions never collides on the (day, order) unique index midway.
    pub fn reorder_routines(&self, day: DayOfWeek, routine_ids: &[i64]) -> DbResult<()> {
        if routine_ids.is_empty() {
            return Err(DbError::Invalid("routine_ids must not be empty".into()));
        }
        let mut seen = HashSet::new();
        if !routine_ids.iter().all(|id| seen.insert(*id)) {
            return Err(DbError::Invalid("routine_ids must not contain duplicates".into()));
        }

        self.with_transaction(|tx| {
            let mut park = tx.prepare(
                "UPDATE routines SET order_index = ?1 WHERE id = ?2 AND day_of_week = ?3",
            )?;
            for (index, id) in routine_ids.iter().enumerate() {
                let changed = park
                    .execute(params![-(index as i64) - 1, id, day.as_str()])
                    .or_conflict(ORDER_TAKEN)?;
                if changed == 0 {
                    return Err(DbError::NotFound(format!(
                        "Routine {id} is not scheduled on {}",
                        day.as_str()
                    )));
                }
            }
            for (index, id) in routine_ids.iter().enumerate() {
                park.execute(params![index as i64, id, day.as_str()])
                    .or_conflict(ORDER_TAKEN)?;
            }
            tracing::debug!(day = day.as_str(), count = routine_ids.len(), "Reordered routines");
            Ok(())
        })
    }
}
