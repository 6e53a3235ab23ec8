use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Category, DayOfWeek, ExerciseType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    pub id: i64,
    pub exercise_id: i64,
    pub day_of_week: DayOfWeek,
    pub order_index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A routine row joined with the exercise it schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledExercise {
    pub routine_id: i64,
    pub exercise_id: i64,
    pub order_index: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_sets: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_done: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: DayOfWeek,
    pub title: String,
    pub exercises: Vec<ScheduledExercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoutineInput {
    pub exercise_id: i64,
    pub day_of_week: DayOfWeek,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRoutineInput {
    pub order_index: Option<i64>,
    pub notes: Option<String>,
}

impl UpdateRoutineInput {
    pub fn is_empty(&self) -> bool {
        self.order_index.is_none() && self.notes.is_none()
    }
}
