use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every state change of a timer produces an event.
/// Front ends render them; the active training run consumes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Started {
        remaining_secs: u32,
    },
    Paused {
        remaining_secs: u32,
    },
    Resumed {
        remaining_secs: u32,
    },
    Reset {
        remaining_secs: u32,
    },
    PhaseEntered {
        phase: Phase,
        exercise_index: usize,
        round: u32,
        duration_secs: u32,
    },
    /// Three seconds left in a work or rest phase.
    Warning {
        phase: Phase,
        remaining_secs: u32,
    },
    ExerciseCompleted {
        exercise_index: usize,
    },
    Finished,
}
