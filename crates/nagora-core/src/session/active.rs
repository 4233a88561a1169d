use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::recorder::{record_session, WeightMap};
use super::TrainingSession;
use crate::card::Card;
use crate::error::ValidationError;
use crate::events::TimerEvent;
use crate::timer::TimerConfig;

/// Bookkeeping for a run in progress: which exercises the timer has
/// completed and which weights were entered, until the run is saved.
#[derive(Debug, Clone)]
pub struct ActiveTraining {
    card: Card,
    weights: WeightMap,
    timer_config: TimerConfig,
    started_at: DateTime<Utc>,
    completed: BTreeSet<usize>,
    current_exercise: usize,
    timer_finished: bool,
}

impl ActiveTraining {
    pub fn new(
        card: Card,
        weights: WeightMap,
        timer_config: TimerConfig,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            card,
            weights,
            timer_config,
            started_at,
            completed: BTreeSet::new(),
            current_exercise: 0,
            timer_finished: false,
        }
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn weights(&self) -> &WeightMap {
        &self.weights
    }

    pub fn timer_config(&self) -> TimerConfig {
        self.timer_config
    }

    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn current_exercise(&self) -> usize {
        self.current_exercise
    }

    pub fn is_timer_finished(&self) -> bool {
        self.timer_finished
    }

    /// Enter or change the weight for a training exercise mid-run.
    pub fn set_weight(&mut self, index: usize, weight: f64) -> Result<(), ValidationError> {
        let len = self.card.exercise_count();
        if index >= len {
            return Err(ValidationError::OutOfBounds {
                collection: "exercises".into(),
                index,
                len,
            });
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "weight".into(),
                message: format!("{weight} is not a usable weight"),
            });
        }
        self.weights.insert(index, weight);
        Ok(())
    }

    /// Fold a timer event into the run.
    ///
    /// Counters have no per-exercise structure, so when a counter finishes
    /// the whole card counts as done, until the counter is reset.
    pub fn handle_event(&mut self, event: &TimerEvent) {
        match event {
            TimerEvent::ExerciseCompleted { exercise_index } => {
                self.completed.insert(*exercise_index);
                self.current_exercise = *exercise_index;
            }
            TimerEvent::PhaseEntered { exercise_index, .. } => {
                self.current_exercise = *exercise_index;
            }
            TimerEvent::Finished => {
                self.timer_finished = true;
                if matches!(self.timer_config, TimerConfig::Simple(_)) {
                    self.completed.extend(0..self.card.exercise_count());
                }
            }
            TimerEvent::Reset { .. } => {
                self.current_exercise = 0;
                self.timer_finished = false;
                if matches!(self.timer_config, TimerConfig::Simple(_)) {
                    self.completed.clear();
                }
            }
            TimerEvent::Started { .. }
            | TimerEvent::Paused { .. }
            | TimerEvent::Resumed { .. }
            | TimerEvent::Warning { .. } => {}
        }
    }

    /// Whole seconds since the run started.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_seconds().max(0) as u64
    }

    /// Record the run as a session.
    pub fn finish(self, now: DateTime<Utc>) -> TrainingSession {
        let elapsed = self.elapsed_secs(now);
        record_session(
            &self.card,
            &self.weights,
            self.timer_config,
            &self.completed,
            elapsed,
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardSide, Exercise};
    use crate::session::SessionStatus;
    use crate::timer::{Phase, SilentCues, SimpleConfig, SimpleKind, SimpleTimer};
    use chrono::Duration;

    fn card() -> Card {
        Card {
            id: Some("card-1".into()),
            front: CardSide {
                exercises: vec![Exercise::new("Squat"), Exercise::new("Row")],
                ..CardSide::default()
            },
            back: CardSide::default(),
        }
    }

    #[test]
    fn completion_events_drive_status() {
        let start = Utc::now();
        let mut run = ActiveTraining::new(card(), WeightMap::new(), TimerConfig::default(), start);
        run.handle_event(&TimerEvent::ExerciseCompleted { exercise_index: 0 });
        run.handle_event(&TimerEvent::PhaseEntered {
            phase: Phase::RestBetween,
            exercise_index: 1,
            round: 1,
            duration_secs: 10,
        });
        assert_eq!(run.current_exercise(), 1);

        let partial = run.clone().finish(start + Duration::seconds(95));
        assert_eq!(partial.status, SessionStatus::Partial);
        assert_eq!(partial.total_time, 95);

        run.handle_event(&TimerEvent::ExerciseCompleted { exercise_index: 1 });
        run.handle_event(&TimerEvent::Finished);
        assert!(run.is_timer_finished());
        let done = run.finish(start + Duration::seconds(120));
        assert_eq!(done.status, SessionStatus::Completed);
    }

    #[test]
    fn finished_counter_completes_card() {
        let config = TimerConfig::Simple(SimpleConfig {
            kind: SimpleKind::Reverse,
            initial_time: 60,
        });
        let mut run = ActiveTraining::new(card(), WeightMap::new(), config, Utc::now());
        run.handle_event(&TimerEvent::Finished);
        assert_eq!(run.completed().len(), 2);
    }

    #[test]
    fn reset_counter_is_no_longer_complete() {
        let config = SimpleConfig {
            kind: SimpleKind::Reverse,
            initial_time: 1,
        };
        let mut run = ActiveTraining::new(
            card(),
            WeightMap::new(),
            TimerConfig::Simple(config),
            Utc::now(),
        );
        let mut counter = SimpleTimer::new(config, SilentCues);
        for event in counter.start() {
            run.handle_event(&event);
        }
        for event in counter.tick() {
            run.handle_event(&event);
        }
        assert!(run.is_timer_finished());
        assert_eq!(run.completed().len(), 2);

        run.handle_event(&counter.reset());
        assert!(run.completed().is_empty());
        let session = run.finish(Utc::now());
        assert_eq!(session.status, SessionStatus::Partial);
    }

    #[test]
    fn set_weight_checks_index_and_value() {
        let mut run = ActiveTraining::new(card(), WeightMap::new(), TimerConfig::default(), Utc::now());
        run.set_weight(1, 22.5).unwrap();
        assert_eq!(run.weights().get(&1), Some(&22.5));
        assert!(matches!(
            run.set_weight(2, 10.0),
            Err(ValidationError::OutOfBounds { index: 2, len: 2, .. })
        ));
        assert!(run.set_weight(0, f64::NAN).is_err());
    }

    #[test]
    fn clock_skew_never_goes_negative() {
        let start = Utc::now();
        let run = ActiveTraining::new(card(), WeightMap::new(), TimerConfig::default(), start);
        assert_eq!(run.elapsed_secs(start - Duration::seconds(5)), 0);
    }
}
