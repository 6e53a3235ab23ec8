use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One recorded session of one exercise on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub exercise_id: i64,
    pub session_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub sets_completed: Vec<u32>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    pub is_pr: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseHistory {
    pub exercise_id: i64,
    pub exercise_name: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub weight: f64,
    pub date: NaiveDate,
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHistoryInput {
    pub exercise_id: i64,
    pub session_date: NaiveDate,
    pub weight: Option<f64>,
    pub sets_completed: Vec<u32>,
    #[serde(default)]
    pub completed: bool,
    pub volume: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedHistory {
    pub id: i64,
    pub is_pr: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHistoryInput {
    pub weight: Option<f64>,
    pub sets_completed: Option<Vec<u32>>,
    pub completed: Option<bool>,
    pub volume: Option<f64>,
    pub notes: Option<String>,
}

impl UpdateHistoryInput {
    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.sets_completed.is_none()
            && self.completed.is_none()
            && self.volume.is_none()
            && self.notes.is_none()
    }
}
