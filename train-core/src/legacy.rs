//! One-shot import of the legacy `train.json` week plan into a fresh store.
//!
//! The legacy file is a JSON object keyed by weekday. Each day carries a title
//! and an ordered list of exercises, and every exercise carries its own copy
//! of the session history. The import flattens that into exercises, routines,
//! history and day titles, then moves the file aside.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use serde::Deserialize;

use crate::db::{
    self, insert_exercise, insert_history, insert_routine, Database, DbError, DbResult,
};
use crate::models::*;

type LegacyPlan = BTreeMap<String, LegacyDay>;

// The legacy writer emitted `null` for absent values, so every field is
// optional and read back through the accessors below.
#[derive(Debug, Deserialize)]
struct LegacyDay {
    title: Option<String>,
    exercises: Option<Vec<LegacyExercise>>,
}

impl LegacyDay {
    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    fn exercises(&self) -> &[LegacyExercise] {
        self.exercises.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyExercise {
    text: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    target: Option<LegacyTarget>,
    current_weight: Option<f64>,
    history: Option<Vec<LegacySession>>,
}

impl LegacyExercise {
    fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or_default()
    }

    /// Cardio entries never had a name, only free text.
    fn key(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.text(),
        }
    }

    fn history(&self) -> &[LegacySession] {
        self.history.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct LegacyTarget {
    sets: Option<i64>,
    reps: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct LegacySession {
    date: Option<String>,
    weight: Option<f64>,
    sets: Option<Vec<u32>>,
    completed: Option<bool>,
    volume: Option<f64>,
}

impl LegacySession {
    fn weight(&self) -> f64 {
        self.weight.unwrap_or_default()
    }
}

/// Row counts written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub exercises: usize,
    pub history: usize,
    pub routines: usize,
    pub days: usize,
}

/// Where the legacy file is moved once its contents live in the database.
pub fn backup_path(legacy_path: &Path) -> PathBuf {
    let mut name = OsString::from(legacy_path.as_os_str());
    name.push(".backup");
    PathBuf::from(name)
}

/// The import only ever runs into a database that does not exist yet.
pub fn should_import(db_path: &Path, legacy_path: &Path) -> bool {
    !db_path.exists() && legacy_path.exists()
}

/// Import `legacy_path` into a new database at `db_path`.
///
/// Returns `Ok(None)` without touching anything when there is nothing to do.
/// A failed import removes the half-written database file so that the next
/// start tries again.
pub fn import(db_path: &Path, legacy_path: &Path) -> Result<Option<ImportSummary>> {
    if !should_import(db_path, legacy_path) {
        tracing::debug!(
            db = %db_path.display(),
            legacy = %legacy_path.display(),
            "Legacy import not needed"
        );
        return Ok(None);
    }

    tracing::info!(legacy = %legacy_path.display(), "Database not found, importing legacy plan");

    let raw = fs::read_to_string(legacy_path)
        .with_context(|| format!("failed to read {}", legacy_path.display()))?;
    let plan: LegacyPlan = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", legacy_path.display()))?;

    let summary = match write_plan(db_path, &plan) {
        Ok(summary) => summary,
        Err(err) => {
            if let Err(remove_err) = fs::remove_file(db_path) {
                tracing::warn!(
                    db = %db_path.display(),
                    "Could not remove partially imported database: {}",
                    remove_err
                );
            }
            return Err(err.context("legacy import failed"));
        }
    };

    tracing::info!(
        exercises = summary.exercises,
        history = summary.history,
        routines = summary.routines,
        days = summary.days,
        "Legacy import completed"
    );

    let backup = backup_path(legacy_path);
    match fs::rename(legacy_path, &backup) {
        Ok(()) => tracing::info!(backup = %backup.display(), "Backed up legacy plan"),
        Err(err) => tracing::warn!(
            legacy = %legacy_path.display(),
            "Failed to back up legacy plan: {}",
            err
        ),
    }

    Ok(Some(summary))
}

fn write_plan(db_path: &Path, plan: &LegacyPlan) -> Result<ImportSummary> {
    let db = Database::open(db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    db.migrate().context("failed to create schema")?;
    let summary = db.with_transaction(|tx| import_plan(tx, plan))?;
    Ok(summary)
}

struct ExerciseSeed {
    input: CreateExerciseInput,
    sessions: BTreeMap<NaiveDate, LegacySession>,
}

fn import_plan(conn: &Connection, plan: &LegacyPlan) -> DbResult<ImportSummary> {
    let mut days: Vec<(DayOfWeek, &LegacyDay)> = Vec::new();
    for (key, day) in plan {
        match DayOfWeek::from_str(key) {
            Some(day_of_week) => days.push((day_of_week, day)),
            None => tracing::warn!(key = %key, "Skipping legacy entry that is not a weekday"),
        }
    }
    days.sort_by_key(|(day_of_week, _)| *day_of_week);

    // Exercises in first-seen order; the first occurrence fixes the type.
    let mut order: Vec<String> = Vec::new();
    let mut seeds: HashMap<String, ExerciseSeed> = HashMap::new();

    for (_, day) in &days {
        for entry in day.exercises() {
            let name = entry.key();
            if name.is_empty() {
                tracing::warn!("Skipping legacy exercise without name or text");
                continue;
            }

            if !seeds.contains_key(name) {
                let exercise_type = ExerciseType::from_str(entry.kind()).ok_or_else(|| {
                    DbError::Invalid(format!("unknown exercise type {:?} for {name}", entry.kind()))
                })?;
                order.push(name.to_string());
                seeds.insert(
                    name.to_string(),
                    ExerciseSeed {
                        input: CreateExerciseInput {
                            name: name.to_string(),
                            exercise_type,
                            category: infer_category(name),
                            target_sets: None,
                            target_reps: None,
                            target_weight: None,
                        },
                        sessions: BTreeMap::new(),
                    },
                );
            }

            let Some(seed) = seeds.get_mut(name) else {
                continue;
            };
            apply_targets(&mut seed.input, entry);
            for session in entry.history() {
                merge_session(&mut seed.sessions, name, session);
            }
        }
    }

    let mut summary = ImportSummary::default();
    let mut ids: HashMap<&str, i64> = HashMap::new();

    tracing::info!(count = order.len(), "Importing unique exercises");
    for name in &order {
        let seed = &seeds[name];
        let id = insert_exercise(conn, &seed.input)?;
        ids.insert(name.as_str(), id);
        summary.exercises += 1;

        let pr_date = personal_record_date(&seed.sessions);
        for (date, session) in &seed.sessions {
            let input = CreateHistoryInput {
                exercise_id: id,
                session_date: *date,
                weight: positive(session.weight),
                sets_completed: session.sets.clone().unwrap_or_default(),
                completed: session.completed.unwrap_or_default(),
                volume: positive(session.volume),
                notes: None,
            };
            insert_history(conn, &input, pr_date == Some(*date))?;
            summary.history += 1;
        }
    }

    tracing::info!("Importing routines");
    for (day_of_week, day) in &days {
        db::upsert_day_title(conn, *day_of_week, day.title())?;
        summary.days += 1;

        let mut position = 0;
        for entry in day.exercises() {
            let Some(&exercise_id) = ids.get(entry.key()) else {
                continue;
            };
            let notes = match ExerciseType::from_str(entry.kind()) {
                Some(ExerciseType::Weight | ExerciseType::Bodyweight) => None,
                _ => Some(entry.text()),
            };
            insert_routine(conn, exercise_id, *day_of_week, position, notes)?;
            position += 1;
            summary.routines += 1;
        }
    }

    Ok(summary)
}

/// The first entry that carries targets fixes them for the exercise.
fn apply_targets(input: &mut CreateExerciseInput, entry: &LegacyExercise) {
    let has_targets =
        input.target_sets.is_some() || input.target_reps.is_some() || input.target_weight.is_some();
    if has_targets {
        return;
    }

    match ExerciseType::from_str(entry.kind()) {
        Some(kind @ (ExerciseType::Weight | ExerciseType::Bodyweight)) => {
            if let Some(target) = &entry.target {
                input.target_sets = target.sets;
                input.target_reps = target.reps;
            }
            if kind == ExerciseType::Weight {
                input.target_weight = positive(entry.current_weight);
            }
        }
        _ => {}
    }
}

/// Several days may list the same exercise, each with its own copy of the
/// history. Keep one session per date, preferring the heavier one.
fn merge_session(
    sessions: &mut BTreeMap<NaiveDate, LegacySession>,
    name: &str,
    session: &LegacySession,
) {
    let raw_date = session.date.as_deref().unwrap_or_default();
    let Some(date) = parse_legacy_date(raw_date) else {
        tracing::warn!(exercise = %name, date = %raw_date, "Skipping session with unreadable date");
        return;
    };
    match sessions.get(&date) {
        Some(existing) if existing.weight() >= session.weight() => {}
        _ => {
            sessions.insert(date, session.clone());
        }
    }
}

/// The date of the heaviest positive session, whatever the exercise type.
/// Walking forward in time, ties go to the session that reached the weight
/// first.
fn personal_record_date(sessions: &BTreeMap<NaiveDate, LegacySession>) -> Option<NaiveDate> {
    let mut best: Option<(NaiveDate, f64)> = None;
    for (date, session) in sessions {
        let weight = session.weight();
        if weight > 0.0 && best.map_or(true, |(_, top)| weight > top) {
            best = Some((*date, weight));
        }
    }
    best.map(|(date, _)| date)
}

fn parse_legacy_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| raw.get(..10).and_then(|prefix| prefix.parse().ok()))
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

static NON_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z\s]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::LegsPush,
        &["leg press", "squat", "lunge", "leg extension", "hack squat"],
    ),
    (
        Category::LegsPull,
        &["leg curl", "deadlift", "romanian deadlift", "hamstring"],
    ),
    (
        Category::ArmsPush,
        &["chest press", "bench press", "shoulder press", "tricep", "overhead press", "dip"],
    ),
    (
        Category::ArmsPull,
        &["lat pulldown", "pull up", "chin up", "row", "bicep", "curl"],
    ),
    (Category::CorePush, &["ab machine", "crunch", "sit up", "ab wheel"]),
    (
        Category::CorePull,
        &["hanging knee raise", "leg raise", "plank", "back extension"],
    ),
];

static CATEGORY_PATTERNS: Lazy<Vec<(Category, Vec<Regex>)>> = Lazy::new(|| {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let patterns = keywords
                .iter()
                .map(|keyword| Regex::new(&format!(r"(?i)\b{keyword}\b")).expect("valid regex"))
                .collect();
            (*category, patterns)
        })
        .collect()
});

/// Guess a category from an exercise name. Categories are tried in a fixed
/// order and the first keyword hit wins, so "Leg Curl" is Legs-Pull even
/// though "curl" alone means Arms-Pull.
pub fn infer_category(name: &str) -> Option<Category> {
    let cleaned = NON_LETTERS.replace_all(name, "");
    let cleaned = WHITESPACE.replace_all(cleaned.trim(), " ");

    CATEGORY_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(&cleaned)))
        .map(|(category, _)| *category)
}
