use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Weight,
    Bodyweight,
    Cardio,
    Assisted,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Bodyweight => "bodyweight",
            Self::Cardio => "cardio",
            Self::Assisted => "assisted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "weight" => Some(Self::Weight),
            "bodyweight" => Some(Self::Bodyweight),
            "cardio" => Some(Self::Cardio),
            "assisted" => Some(Self::Assisted),
            _ => None,
        }
    }

    /// Assisted machines subtract load, so less weight is progress.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Self::Assisted)
    }

    /// Whether `candidate` strictly beats the best weight recorded so far.
    /// Non-positive weights never count.
    pub fn beats(&self, candidate: f64, best: Option<f64>) -> bool {
        if candidate <= 0.0 {
            return false;
        }
        match best {
            None => true,
            Some(best) if self.lower_is_better() => candidate < best,
            Some(best) => candidate > best,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    #[serde(rename = "Legs-Push")]
    LegsPush,
    #[serde(rename = "Legs-Pull")]
    LegsPull,
    #[serde(rename = "Arms-Push")]
    ArmsPush,
    #[serde(rename = "Arms-Pull")]
    ArmsPull,
    #[serde(rename = "Core-Push")]
    CorePush,
    #[serde(rename = "Core-Pull")]
    CorePull,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::LegsPush,
        Self::LegsPull,
        Self::ArmsPush,
        Self::ArmsPull,
        Self::CorePush,
        Self::CorePull,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegsPush => "Legs-Push",
            Self::LegsPull => "Legs-Pull",
            Self::ArmsPush => "Arms-Push",
            Self::ArmsPull => "Arms-Pull",
            Self::CorePush => "Core-Push",
            Self::CorePull => "Core-Pull",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExerciseInput {
    pub name: String,
    pub exercise_type: ExerciseType,
    pub category: Option<Category>,
    pub target_sets: Option<i64>,
    pub target_reps: Option<i64>,
    pub target_weight: Option<f64>,
}

/// Partial update of an exercise. `None` leaves a column as it is;
/// `category: Some(None)` clears the category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExerciseInput {
    pub name: Option<String>,
    pub exercise_type: Option<ExerciseType>,
    pub category: Option<Option<Category>>,
    pub target_sets: Option<i64>,
    pub target_reps: Option<i64>,
    pub target_weight: Option<f64>,
}

impl UpdateExerciseInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.exercise_type.is_none()
            && self.category.is_none()
            && self.target_sets.is_none()
            && self.target_reps.is_none()
            && self.target_weight.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExerciseFilter {
    pub search: Option<String>,
    pub exercise_type: Option<ExerciseType>,
    pub category: Option<Category>,
}
