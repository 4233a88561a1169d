//! Audible cues requested by the timers.
//!
//! Timers never produce sound themselves. They call a [`CueSink`] handed to
//! them at construction, so tests can run silently and front ends decide how
//! a cue is rendered.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cue {
    Beep,
    Start,
    Work,
    Rest,
    ExerciseChange,
    Complete,
    Warning,
}

impl Cue {
    /// Volume the timers request for this cue, 0.0 ..= 1.0.
    pub fn default_volume(self) -> f32 {
        match self {
            Cue::Start | Cue::Work | Cue::ExerciseChange => 0.4,
            Cue::Beep | Cue::Rest | Cue::Warning => 0.3,
            Cue::Complete => 0.5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Cue::Beep => "beep",
            Cue::Start => "start",
            Cue::Work => "work",
            Cue::Rest => "rest",
            Cue::ExerciseChange => "exercise-change",
            Cue::Complete => "complete",
            Cue::Warning => "warning",
        }
    }
}

/// Receiver for cue requests. Whether playback succeeds is not the timer's
/// concern, so there is no error channel.
pub trait CueSink {
    fn play(&mut self, cue: Cue, volume: f32);
}

/// Drops every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCues;

impl CueSink for SilentCues {
    fn play(&mut self, _cue: Cue, _volume: f32) {}
}

/// Records cues in order.
impl CueSink for Vec<(Cue, f32)> {
    fn play(&mut self, cue: Cue, volume: f32) {
        self.push((cue, volume));
    }
}

impl<S: CueSink + ?Sized> CueSink for &mut S {
    fn play(&mut self, cue: Cue, volume: f32) {
        (**self).play(cue, volume);
    }
}

impl<S: CueSink + ?Sized> CueSink for Box<S> {
    fn play(&mut self, cue: Cue, volume: f32) {
        (**self).play(cue, volume);
    }
}
