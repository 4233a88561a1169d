//! Tabata timer engine.
//!
//! A tick-driven state machine. It does not own a clock or a thread: the
//! caller invokes `tick()` once per second while the run is active.
//!
//! ## Phase Transitions
//!
//! ```text
//! Prep -> Work -> Rest -> (Work -> Rest) x (rounds - 1)
//!      -> RestBetween -> Prep (next exercise) -> ... -> Finished
//! ```
//!
//! The last exercise goes straight from its final rest to `Finished`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = TabataTimer::new(card.training_exercises(), config, SilentCues);
//! timer.start();
//! // Once per second:
//! for event in timer.tick() { /* render */ }
//! ```

use serde::{Deserialize, Serialize};

use super::config::TabataConfig;
use super::cue::{Cue, CueSink, SilentCues};
use super::{Phase, RunState, TimerSnapshot, TrainingTimer};
use crate::card::Exercise;
use crate::events::TimerEvent;

/// Seconds left in a work or rest phase when the warning cue sounds.
pub const WARNING_SECS: u32 = 3;

/// Current phase with its countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum PhaseState {
    Prep { remaining_secs: u32 },
    Work { remaining_secs: u32 },
    Rest { remaining_secs: u32 },
    RestBetween { remaining_secs: u32 },
    Finished,
}

impl PhaseState {
    pub fn phase(&self) -> Phase {
        match self {
            PhaseState::Prep { .. } => Phase::Prep,
            PhaseState::Work { .. } => Phase::Work,
            PhaseState::Rest { .. } => Phase::Rest,
            PhaseState::RestBetween { .. } => Phase::RestBetween,
            PhaseState::Finished => Phase::Finished,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        match *self {
            PhaseState::Prep { remaining_secs }
            | PhaseState::Work { remaining_secs }
            | PhaseState::Rest { remaining_secs }
            | PhaseState::RestBetween { remaining_secs } => remaining_secs,
            PhaseState::Finished => 0,
        }
    }

    fn count_down(&mut self) {
        match self {
            PhaseState::Prep { remaining_secs }
            | PhaseState::Work { remaining_secs }
            | PhaseState::Rest { remaining_secs }
            | PhaseState::RestBetween { remaining_secs } => {
                *remaining_secs = remaining_secs.saturating_sub(1);
            }
            PhaseState::Finished => {}
        }
    }
}

/// Interval timer for one training run over an ordered exercise list.
#[derive(Debug)]
pub struct TabataTimer<C: CueSink = SilentCues> {
    config: TabataConfig,
    exercises: Vec<Exercise>,
    state: PhaseState,
    run: RunState,
    exercise_index: usize,
    round: u32,
    cues: C,
}

impl<C: CueSink> TabataTimer<C> {
    /// Create an idle timer positioned at the first exercise's prep phase.
    pub fn new(exercises: Vec<Exercise>, config: TabataConfig, cues: C) -> Self {
        Self {
            state: PhaseState::Prep {
                remaining_secs: config.prep_time,
            },
            config,
            exercises,
            run: RunState::Idle,
            exercise_index: 0,
            round: 1,
            cues,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> PhaseState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.state.remaining_secs()
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn exercise_index(&self) -> usize {
        self.exercise_index
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn config(&self) -> &TabataConfig {
        &self.config
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.exercises.get(self.exercise_index)
    }

    /// Exercises still ahead of the current one.
    pub fn remaining_exercises(&self) -> usize {
        self.exercises
            .len()
            .saturating_sub(self.exercise_index + 1)
    }

    pub fn cues(&self) -> &C {
        &self.cues
    }

    pub fn into_cues(self) -> C {
        self.cues
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start an idle run. Has no effect while running, paused or finished.
    pub fn start(&mut self) -> Vec<TimerEvent> {
        if self.run != RunState::Idle || self.state == PhaseState::Finished {
            return Vec::new();
        }
        self.run = RunState::Running;
        self.play(Cue::Start);
        let mut events = vec![TimerEvent::Started {
            remaining_secs: self.remaining_secs(),
        }];
        if self.exercises.is_empty() {
            self.finish(&mut events);
        } else {
            self.settle(&mut events);
        }
        events
    }

    pub fn pause(&mut self) -> Option<TimerEvent> {
        match self.run {
            RunState::Running => {
                self.run = RunState::Paused;
                Some(TimerEvent::Paused {
                    remaining_secs: self.remaining_secs(),
                })
            }
            RunState::Idle | RunState::Paused => None,
        }
    }

    pub fn resume(&mut self) -> Option<TimerEvent> {
        match self.run {
            RunState::Paused => {
                self.run = RunState::Running;
                Some(TimerEvent::Resumed {
                    remaining_secs: self.remaining_secs(),
                })
            }
            RunState::Idle | RunState::Running => None,
        }
    }

    /// Back to the first exercise's prep phase, idle.
    pub fn reset(&mut self) -> TimerEvent {
        self.run = RunState::Idle;
        self.exercise_index = 0;
        self.round = 1;
        self.state = PhaseState::Prep {
            remaining_secs: self.config.prep_time,
        };
        TimerEvent::Reset {
            remaining_secs: self.config.prep_time,
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Only a running timer moves. When the countdown hits zero the phase
    /// transitions, and zero-length phases are passed through in the same call.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.run != RunState::Running {
            return events;
        }
        self.state.count_down();
        self.warn_if_due(&mut events);
        self.settle(&mut events);
        events
    }

    /// Build a display snapshot.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase(),
            run_state: self.run,
            remaining_secs: self.remaining_secs(),
            exercise_index: self.exercise_index,
            exercise_count: self.exercises.len(),
            exercise_name: self.current_exercise().map(Exercise::label),
            round: self.round,
            rounds: self.config.rounds,
            remaining_exercises: self.remaining_exercises(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Transition while the running countdown sits at zero. Every pass either
    /// moves to a later phase or a later exercise, so this terminates.
    fn settle(&mut self, events: &mut Vec<TimerEvent>) {
        while self.run == RunState::Running
            && self.state != PhaseState::Finished
            && self.remaining_secs() == 0
        {
            self.advance(events);
        }
    }

    fn advance(&mut self, events: &mut Vec<TimerEvent>) {
        match self.state {
            PhaseState::Prep { .. } => {
                let next = PhaseState::Work {
                    remaining_secs: self.config.work_time,
                };
                self.enter(next, Cue::Work, events);
            }
            PhaseState::Work { .. } => {
                let next = PhaseState::Rest {
                    remaining_secs: self.config.rest_time,
                };
                self.enter(next, Cue::Rest, events);
            }
            PhaseState::Rest { .. } => {
                if self.round < self.config.effective_rounds() {
                    self.round += 1;
                    let next = PhaseState::Work {
                        remaining_secs: self.config.work_time,
                    };
                    self.enter(next, Cue::Work, events);
                    return;
                }
                events.push(TimerEvent::ExerciseCompleted {
                    exercise_index: self.exercise_index,
                });
                if self.exercise_index + 1 < self.exercises.len() {
                    self.exercise_index += 1;
                    self.round = 1;
                    let next = PhaseState::RestBetween {
                        remaining_secs: self.config.rest_between_exercises,
                    };
                    self.enter(next, Cue::ExerciseChange, events);
                } else {
                    self.finish(events);
                }
            }
            PhaseState::RestBetween { .. } => {
                let next = PhaseState::Prep {
                    remaining_secs: self.config.prep_time,
                };
                self.enter(next, Cue::Beep, events);
            }
            PhaseState::Finished => {}
        }
    }

    fn enter(&mut self, next: PhaseState, cue: Cue, events: &mut Vec<TimerEvent>) {
        self.state = next;
        tracing::debug!(
            phase = ?next.phase(),
            exercise = self.exercise_index,
            round = self.round,
            remaining_secs = next.remaining_secs(),
            "phase entered"
        );
        self.play(cue);
        events.push(TimerEvent::PhaseEntered {
            phase: next.phase(),
            exercise_index: self.exercise_index,
            round: self.round,
            duration_secs: next.remaining_secs(),
        });
        self.warn_if_due(events);
    }

    /// Work and rest warn once when [`WARNING_SECS`] remain, including a
    /// phase that starts with exactly that much.
    fn warn_if_due(&mut self, events: &mut Vec<TimerEvent>) {
        let remaining = self.remaining_secs();
        if remaining == WARNING_SECS
            && matches!(self.state, PhaseState::Work { .. } | PhaseState::Rest { .. })
        {
            self.play(Cue::Warning);
            events.push(TimerEvent::Warning {
                phase: self.phase(),
                remaining_secs: remaining,
            });
        }
    }

    fn finish(&mut self, events: &mut Vec<TimerEvent>) {
        self.state = PhaseState::Finished;
        self.run = RunState::Idle;
        tracing::debug!(exercises = self.exercises.len(), "training run finished");
        self.play(Cue::Complete);
        events.push(TimerEvent::Finished);
    }

    fn play(&mut self, cue: Cue) {
        self.cues.play(cue, cue.default_volume());
    }
}

impl<C: CueSink> TrainingTimer for TabataTimer<C> {
    fn start(&mut self) -> Vec<TimerEvent> {
        TabataTimer::start(self)
    }

    fn pause(&mut self) -> Option<TimerEvent> {
        TabataTimer::pause(self)
    }

    fn resume(&mut self) -> Option<TimerEvent> {
        TabataTimer::resume(self)
    }

    fn reset(&mut self) -> TimerEvent {
        TabataTimer::reset(self)
    }

    fn tick(&mut self) -> Vec<TimerEvent> {
        TabataTimer::tick(self)
    }

    fn snapshot(&self) -> TimerSnapshot {
        TabataTimer::snapshot(self)
    }

    fn is_finished(&self) -> bool {
        self.state == PhaseState::Finished
    }
}
