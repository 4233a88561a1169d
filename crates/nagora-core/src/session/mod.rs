//! Training sessions: the immutable record of one run against a card.

mod active;
mod recorder;

pub use active::ActiveTraining;
pub use recorder::{record_session, WeightMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::Exercise;
use crate::timer::TimerConfig;

/// Card id stored when a session is recorded against a card without one.
pub const UNKNOWN_CARD_ID: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Completed,
    Partial,
}

impl SessionStatus {
    pub fn label(self) -> &'static str {
        match self {
            SessionStatus::Completed => "completed",
            SessionStatus::Partial => "partial",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseWithWeight {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<String>,
    /// Kilograms. Absent when none was entered, never defaulted to 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl ExerciseWithWeight {
    pub fn new(exercise: Exercise, weight: Option<f64>) -> Self {
        Self {
            name: exercise.name,
            repetitions: exercise.repetitions,
            weight,
        }
    }

    /// `"Squat (20kg)"` when a weight was recorded.
    pub fn label(&self) -> String {
        match self.weight {
            Some(w) if w != 0.0 => format!("{} ({w}kg)", self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: String,
    pub card_id: String,
    pub date: DateTime<Utc>,
    /// Seconds from start to save.
    pub total_time: u64,
    pub exercises: Vec<ExerciseWithWeight>,
    pub timer_config: TimerConfig,
    pub status: SessionStatus,
}

impl TrainingSession {
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// `"3m 5s"`, or `"45s"` under a minute.
    pub fn duration_label(&self) -> String {
        let minutes = self.total_time / 60;
        let seconds = self.total_time % 60;
        if minutes > 0 {
            format!("{minutes}m {seconds}s")
        } else {
            format!("{seconds}s")
        }
    }
}
