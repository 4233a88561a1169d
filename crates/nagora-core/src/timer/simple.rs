//! Plain stopwatch / countdown used when a run has no interval structure.

use super::config::{SimpleConfig, SimpleKind};
use super::cue::{Cue, CueSink, SilentCues};
use super::{Phase, RunState, TimerSnapshot, TrainingTimer};
use crate::events::TimerEvent;

#[derive(Debug)]
pub struct SimpleTimer<C: CueSink = SilentCues> {
    config: SimpleConfig,
    time_secs: u32,
    run: RunState,
    finished: bool,
    cues: C,
}

impl<C: CueSink> SimpleTimer<C> {
    pub fn new(config: SimpleConfig, cues: C) -> Self {
        Self {
            time_secs: config.initial_time,
            config,
            run: RunState::Idle,
            finished: false,
            cues,
        }
    }

    pub fn time_secs(&self) -> u32 {
        self.time_secs
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn config(&self) -> &SimpleConfig {
        &self.config
    }

    pub fn start(&mut self) -> Vec<TimerEvent> {
        if self.run != RunState::Idle || self.finished {
            return Vec::new();
        }
        self.run = RunState::Running;
        self.cues.play(Cue::Start, Cue::Start.default_volume());
        vec![TimerEvent::Started {
            remaining_secs: self.time_secs,
        }]
    }

    pub fn pause(&mut self) -> Option<TimerEvent> {
        if self.run != RunState::Running {
            return None;
        }
        self.run = RunState::Paused;
        Some(TimerEvent::Paused {
            remaining_secs: self.time_secs,
        })
    }

    pub fn resume(&mut self) -> Option<TimerEvent> {
        if self.run != RunState::Paused {
            return None;
        }
        self.run = RunState::Running;
        Some(TimerEvent::Resumed {
            remaining_secs: self.time_secs,
        })
    }

    /// Single pause button behavior: pause when running, resume when paused.
    pub fn toggle_pause(&mut self) -> Option<TimerEvent> {
        match self.run {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            RunState::Idle => None,
        }
    }

    pub fn reset(&mut self) -> TimerEvent {
        self.run = RunState::Idle;
        self.finished = false;
        self.time_secs = self.config.initial_time;
        TimerEvent::Reset {
            remaining_secs: self.time_secs,
        }
    }

    /// User ends the run early. Counting up has no other way to finish.
    pub fn finish(&mut self) -> Option<TimerEvent> {
        if self.finished {
            return None;
        }
        self.run = RunState::Idle;
        self.finished = true;
        Some(TimerEvent::Finished)
    }

    pub fn tick(&mut self) -> Vec<TimerEvent> {
        if self.run != RunState::Running {
            return Vec::new();
        }
        match self.config.kind {
            SimpleKind::Normal => {
                self.time_secs = self.time_secs.saturating_add(1);
                Vec::new()
            }
            SimpleKind::Reverse => {
                self.time_secs = self.time_secs.saturating_sub(1);
                if self.time_secs > 0 {
                    return Vec::new();
                }
                self.cues.play(Cue::Complete, Cue::Complete.default_volume());
                self.finish().into_iter().collect()
            }
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: if self.finished {
                Phase::Finished
            } else {
                Phase::Work
            },
            run_state: self.run,
            remaining_secs: self.time_secs,
            exercise_index: 0,
            exercise_count: 0,
            exercise_name: None,
            round: 1,
            rounds: 1,
            remaining_exercises: 0,
        }
    }
}

impl<C: CueSink> TrainingTimer for SimpleTimer<C> {
    fn start(&mut self) -> Vec<TimerEvent> {
        SimpleTimer::start(self)
    }

    fn pause(&mut self) -> Option<TimerEvent> {
        SimpleTimer::pause(self)
    }

    fn resume(&mut self) -> Option<TimerEvent> {
        SimpleTimer::resume(self)
    }

    fn reset(&mut self) -> TimerEvent {
        SimpleTimer::reset(self)
    }

    fn tick(&mut self) -> Vec<TimerEvent> {
        SimpleTimer::tick(self)
    }

    fn snapshot(&self) -> TimerSnapshot {
        SimpleTimer::snapshot(self)
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
