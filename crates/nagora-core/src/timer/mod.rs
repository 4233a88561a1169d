mod config;
mod cue;
mod engine;
mod simple;

pub use config::{coerce_number, SimpleConfig, SimpleKind, TabataConfig, TabataField, TimerConfig};
pub use cue::{Cue, CueSink, SilentCues};
pub use engine::{PhaseState, TabataTimer, WARNING_SECS};
pub use simple::SimpleTimer;

use serde::{Deserialize, Serialize};

use crate::events::TimerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Prep,
    Work,
    Rest,
    RestBetween,
    Finished,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Prep => "Get ready",
            Phase::Work => "Work",
            Phase::Rest => "Rest",
            Phase::RestBetween => "Rest between exercises",
            Phase::Finished => "Complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
}

/// Point-in-time view of a timer for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub run_state: RunState,
    /// Countdown for interval timers, elapsed/remaining time for counters.
    pub remaining_secs: u32,
    pub exercise_index: usize,
    pub exercise_count: usize,
    pub exercise_name: Option<String>,
    pub round: u32,
    pub rounds: u32,
    pub remaining_exercises: usize,
}

impl TimerSnapshot {
    /// `mm:ss`, or `hh:mm:ss` past the hour.
    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs)
    }
}

/// Common controls of the timers a training run can use.
pub trait TrainingTimer {
    fn start(&mut self) -> Vec<TimerEvent>;
    fn pause(&mut self) -> Option<TimerEvent>;
    fn resume(&mut self) -> Option<TimerEvent>;
    fn reset(&mut self) -> TimerEvent;
    fn tick(&mut self) -> Vec<TimerEvent>;
    fn snapshot(&self) -> TimerSnapshot;
    fn is_finished(&self) -> bool;
}

pub fn format_clock(secs: u32) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
