use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::exercises::require_exercise;
use super::{ConflictExt, Database, DbError, DbResult};
use crate::models::*;

const HISTORY_COLUMNS: &str =
    "id, exercise_id, session_date, weight, sets_completed, completed, volume, is_pr, notes";

const DUPLICATE_SESSION: &str = "A session for this exercise is already recorded on that date";

/// Most recent sessions returned for one exercise.
const HISTORY_LIMIT: i64 = 200;

fn history_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryEntry> {
    let sets_json: String = row.get(4)?;
    let sets_completed = serde_json::from_str(&sets_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(HistoryEntry {
        id: row.get(0)?,
        exercise_id: row.get(1)?,
        session_date: row.get(2)?,
        weight: row.get(3)?,
        sets_completed,
        completed: row.get(5)?,
        volume: row.get(6)?,
        is_pr: row.get(7)?,
        notes: row.get(8)?,
    })
}

pub(crate) fn insert_history(
    conn: &Connection,
    input: &CreateHistoryInput,
    is_pr: bool,
) -> DbResult<i64> {
    let sets_json = serde_json::to_string(&input.sets_completed)?;
    conn.execute(
        "INSERT INTO history (exercise_id, session_date, weight, sets_completed, completed, volume, is_pr, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            input.exercise_id,
            input.session_date,
            input.weight,
            sets_json,
            input.completed,
            input.volume,
            is_pr,
            input.notes,
        ],
    )
    .or_conflict(DUPLICATE_SESSION)?;
    Ok(conn.last_insert_rowid())
}

/// The best positive weight on record for an exercise, in the direction its
/// type counts as progress.
fn best_weight(
    conn: &Connection,
    exercise_id: i64,
    exercise_type: ExerciseType,
) -> rusqlite::Result<Option<f64>> {
    let sql = if exercise_type.lower_is_better() {
        "SELECT MIN(weight) FROM history WHERE exercise_id = ?1 AND weight > 0"
    } else {
        "SELECT MAX(weight) FROM history WHERE exercise_id = ?1 AND weight > 0"
    };
    conn.query_row(sql, [exercise_id], |row| row.get(0))
}

/// Move the PR flag to whichever remaining session is best. Ties go to the
/// earliest session, which is the one that first reached that weight.
pub(crate) fn refresh_personal_record(
    conn: &Connection,
    exercise_id: i64,
    exercise_type: ExerciseType,
) -> DbResult<()> {
    conn.execute(
        "UPDATE history SET is_pr = 0 WHERE exercise_id = ?1 AND is_pr = 1",
        [exercise_id],
    )?;

    let sql = if exercise_type.lower_is_better() {
        "SELECT id FROM history WHERE exercise_id = ?1 AND weight > 0
         ORDER BY weight ASC, session_date ASC, id ASC LIMIT 1"
    } else {
        "SELECT id FROM history WHERE exercise_id = ?1 AND weight > 0
         ORDER BY weight DESC, session_date ASC, id ASC LIMIT 1"
    };
    let best: Option<i64> = conn
        .query_row(sql, [exercise_id], |row| row.get(0))
        .optional()?;

    if let Some(id) = best {
        conn.execute("UPDATE history SET is_pr = 1 WHERE id = ?1", [id])?;
    }
    Ok(())
}

fn owning_exercise(conn: &Connection, history_id: i64) -> DbResult<(i64, bool)> {
    conn.query_row(
        "SELECT exercise_id, is_pr FROM history WHERE id = ?1",
        [history_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound("History entry not found".into()))
}

impl Database {
    /// Record a session and decide whether it is a new personal record.
    ///
    /// The comparison against the running best, clearing the previous flag
    /// and the insert itself happen in one transaction, so the flag can never
    /// be left on two rows or on none after a new best.
    pub fn record_history(&self, input: CreateHistoryInput) -> DbResult<RecordedHistory> {
        self.with_transaction(|tx| {
            let exercise = require_exercise(tx, input.exercise_id)?;
            let best = best_weight(tx, exercise.id, exercise.exercise_type)?;
            let is_pr = input
                .weight
                .is_some_and(|weight| exercise.exercise_type.beats(weight, best));

            if is_pr {
                tx.execute(
                    "UPDATE history SET is_pr = 0 WHERE exercise_id = ?1 AND is_pr = 1",
                    [exercise.id],
                )?;
            }

            let id = insert_history(tx, &input, is_pr)?;
            if is_pr {
                tracing::info!(
                    exercise = %exercise.name,
                    weight = ?input.weight,
                    "New personal record"
                );
            }
            Ok(RecordedHistory { id, is_pr })
        })
    }

    /// Newest sessions first.
    pub fn list_history(&self, exercise_id: i64) -> DbResult<ExerciseHistory> {
        self.with_connection(|conn| {
            let exercise = require_exercise(conn, exercise_id)?;
            let sql = format!(
                "SELECT {HISTORY_COLUMNS} FROM history
                 WHERE exercise_id = ?1
                 ORDER BY session_date DESC
                 LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let history = stmt
                .query_map(params![exercise_id, HISTORY_LIMIT], history_from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ExerciseHistory {
                exercise_id,
                exercise_name: exercise.name,
                history,
            })
        })
    }

    pub fn get_history_entry(&self, id: i64) -> DbResult<Option<HistoryEntry>> {
        self.with_connection(|conn| {
            let sql = format!("SELECT {HISTORY_COLUMNS} FROM history WHERE id = ?1");
            Ok(conn.query_row(&sql, [id], history_from_row).optional()?)
        })
    }

    pub fn get_personal_record(&self, exercise_id: i64) -> DbResult<Option<PersonalRecord>> {
        self.with_connection(|conn| {
            Ok(conn
                .query_row(
                    "SELECT session_date, weight, volume FROM history
                     WHERE exercise_id = ?1 AND is_pr = 1
                     LIMIT 1",
                    [exercise_id],
                    |row| {
                        Ok(PersonalRecord {
                            date: row.get(0)?,
                            weight: row.get(1)?,
                            volume: row.get(2)?,
                        })
                    },
                )
                .optional()?)
        })
    }

    pub fn update_history(&self, id: i64, input: UpdateHistoryInput) -> DbResult<()> {
        if input.is_empty() {
            return Err(DbError::Invalid("No fields to update".into()));
        }

        self.with_transaction(|tx| {
            let (exercise_id, _) = owning_exercise(tx, id)?;
            let sets_json = input
                .sets_completed
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;

            tx.execute(
                "UPDATE history SET
                    weight = COALESCE(?1, weight),
                    sets_completed = COALESCE(?2, sets_completed),
                    completed = COALESCE(?3, completed),
                    volume = COALESCE(?4, volume),
                    notes = COALESCE(?5, notes)
                 WHERE id = ?6",
                params![
                    input.weight,
                    sets_json,
                    input.completed,
                    input.volume,
                    input.notes,
                    id,
                ],
            )?;

            if input.weight.is_some() {
                let exercise = require_exercise(tx, exercise_id)?;
                refresh_personal_record(tx, exercise_id, exercise.exercise_type)?;
            }
            Ok(())
        })
    }

    pub fn delete_history(&self, id: i64) -> DbResult<()> {
        self.with_transaction(|tx| {
            let (exercise_id, was_pr) = owning_exercise(tx, id)?;
            tx.execute("DELETE FROM history WHERE id = ?1", [id])?;

            if was_pr {
                let exercise = require_exercise(tx, exercise_id)?;
                refresh_personal_record(tx, exercise_id, exercise.exercise_type)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn setup(exercise_type: ExerciseType) -> (Database, i64) {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        let exercise = db
            .create_exercise(CreateExerciseInput {
                name: "Test Exercise".into(),
                exercise_type,
                category: None,
                target_sets: Some(3),
                target_reps: Some(10),
                target_weight: Some(50.0),
            })
            .unwrap();
        (db, exercise.id)
    }

    fn session(exercise_id: i64, weight: f64, date: &str) -> CreateHistoryInput {
        CreateHistoryInput {
            exercise_id,
            session_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            weight: Some(weight),
            sets_completed: vec![10, 10, 10],
            completed: true,
            volume: Some(weight * 30.0),
            notes: None,
        }
    }

    fn pr_ids(db: &Database, exercise_id: i64) -> Vec<i64> {
        db.list_history(exercise_id)
            .unwrap()
            .history
            .into_iter()
            .filter(|h| h.is_pr)
            .map(|h| h.id)
            .collect()
    }

    #[test]
    fn higher_weight_moves_the_flag_for_weight_exercises() {
        let (db, id) = setup(ExerciseType::Weight);

        assert!(db.record_history(session(id, 50.0, "2026-01-01")).unwrap().is_pr);
        assert!(!db.record_history(session(id, 50.0, "2026-01-08")).unwrap().is_pr);

        let third = db.record_history(session(id, 60.0, "2026-01-15")).unwrap();
        assert!(third.is_pr);
        assert!(!db.record_history(session(id, 55.0, "2026-01-22")).unwrap().is_pr);

        assert_eq!(pr_ids(&db, id), vec![third.id]);
    }

    #[test]
    fn lower_weight_is_progress_for_assisted_exercises() {
        let (db, id) = setup(ExerciseType::Assisted);

        assert!(db.record_history(session(id, 50.0, "2026-01-01")).unwrap().is_pr);
        assert!(!db.record_history(session(id, 50.0, "2026-01-08")).unwrap().is_pr);
        assert!(!db.record_history(session(id, 60.0, "2026-01-15")).unwrap().is_pr);

        let fourth = db.record_history(session(id, 40.0, "2026-01-22")).unwrap();
        assert!(fourth.is_pr);
        assert_eq!(pr_ids(&db, id), vec![fourth.id]);
    }

    #[test]
    fn sessions_without_weight_never_set_the_flag() {
        let (db, id) = setup(ExerciseType::Bodyweight);
        let mut input = session(id, 0.0, "2026-01-01");
        input.weight = None;
        assert!(!db.record_history(input).unwrap().is_pr);
        assert!(!db.record_history(session(id, 0.0, "2026-01-02")).unwrap().is_pr);
        assert!(db.get_personal_record(id).unwrap().is_none());
    }

    #[test]
    fn same_date_twice_is_a_conflict() {
        let (db, id) = setup(ExerciseType::Weight);
        db.record_history(session(id, 50.0, "2026-01-01")).unwrap();
        let err = db.record_history(session(id, 70.0, "2026-01-01")).unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
        // The rejected insert must not have cleared the existing flag.
        assert_eq!(pr_ids(&db, id).len(), 1);
    }

    #[test]
    fn unknown_exercise_is_not_found() {
        let (db, _) = setup(ExerciseType::Weight);
        let err = db.record_history(session(999, 50.0, "2026-01-01")).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn deleting_the_record_hands_the_flag_to_the_next_best() {
        let (db, id) = setup(ExerciseType::Weight);
        db.record_history(session(id, 50.0, "2026-01-01")).unwrap();
        let best = db.record_history(session(id, 70.0, "2026-01-08")).unwrap();
        let runner_up = db.record_history(session(id, 60.0, "2026-01-15")).unwrap();

        db.delete_history(best.id).unwrap();
        let pr = db.get_personal_record(id).unwrap().unwrap();
        assert_eq!(pr.weight, 60.0);
        assert_eq!(pr_ids(&db, id), vec![runner_up.id]);
    }

    #[test]
    fn editing_weight_re_derives_the_record() {
        let (db, id) = setup(ExerciseType::Weight);
        let first = db.record_history(session(id, 50.0, "2026-01-01")).unwrap();
        let second = db.record_history(session(id, 60.0, "2026-01-08")).unwrap();

        db.update_history(
            first.id,
            UpdateHistoryInput {
                weight: Some(80.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(pr_ids(&db, id), vec![first.id]);

        db.update_history(
            second.id,
            UpdateHistoryInput {
                notes: Some("felt easy".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let entry = db.get_history_entry(second.id).unwrap().unwrap();
        assert_eq!(entry.notes.as_deref(), Some("felt easy"));
        assert_eq!(entry.weight, Some(60.0));
    }

    #[test]
    fn history_is_newest_first_and_round_trips_sets() {
        let (db, id) = setup(ExerciseType::Weight);
        db.record_history(session(id, 50.0, "2026-01-01")).unwrap();
        db.record_history(session(id, 55.0, "2026-02-01")).unwrap();

        let history = db.list_history(id).unwrap();
        assert_eq!(history.exercise_name, "Test Exercise");
        assert_eq!(history.history[0].session_date.to_string(), "2026-02-01");
        assert_eq!(history.history[1].sets_completed, vec![10, 10, 10]);
    }
}
