//! Preparing and running a training against a card.
//!
//! `prepare` stages weights and timer settings in the library store;
//! `run` drives a live timer in the terminal and records the session.

use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use nagora_core::storage::SoundConfig;
use nagora_core::timer::{coerce_number, TabataField};
use nagora_core::{
    ActiveTraining, Card, Config, Cue, CueSink, Database, Library, SimpleConfig, SimpleKind,
    SimpleTimer, StagedRun, TabataConfig, TabataTimer, TimerConfig, TimerEvent, TrainingSession,
    TrainingTimer, ValidationError, WeightMap,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};

use super::{find_card, open_library};

#[derive(Subcommand)]
pub enum TrainAction {
    /// Stage weights and timer settings for a card's next run
    Prepare {
        card_id: String,
        /// Weight in kg for a training exercise, repeatable
        #[arg(long = "weight", value_name = "IDX=KG")]
        weights: Vec<String>,
        /// Prep seconds
        #[arg(long)]
        prep: Option<String>,
        /// Work seconds
        #[arg(long)]
        work: Option<String>,
        /// Rest seconds
        #[arg(long)]
        rest: Option<String>,
        /// Rounds per exercise
        #[arg(long)]
        rounds: Option<String>,
        /// Rest seconds between exercises
        #[arg(long)]
        rest_between: Option<String>,
    },
    /// Run a live training: p pause, r resume, x reset, s save, q quit
    Run {
        card_id: String,
        /// Use a plain counter instead of the interval timer
        #[arg(long, value_enum)]
        simple: Option<CounterKind>,
        /// Counter start value in seconds
        #[arg(long, default_value = "0")]
        initial: String,
        /// Do not record the session
        #[arg(long)]
        no_save: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CounterKind {
    /// Count up
    Normal,
    /// Count down to zero
    Reverse,
}

impl From<CounterKind> for SimpleKind {
    fn from(kind: CounterKind) -> Self {
        match kind {
            CounterKind::Normal => SimpleKind::Normal,
            CounterKind::Reverse => SimpleKind::Reverse,
        }
    }
}

/// `"2=15.5"` -> exercise index 2 at 15.5 kg.
fn parse_weight(raw: &str) -> Result<(usize, f64), ValidationError> {
    let invalid = |message: String| ValidationError::InvalidValue {
        field: "weight".into(),
        message,
    };
    let (index, kg) = raw
        .split_once('=')
        .ok_or_else(|| invalid(format!("expected IDX=KG, got '{raw}'")))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|_| invalid(format!("'{index}' is not an exercise index")))?;
    let kg = kg
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(format!("'{kg}' is not a weight")))?;
    Ok((index, kg))
}

/// Plays cues as a terminal bell, scaled by the sound settings.
struct TerminalCues {
    sound: SoundConfig,
}

impl CueSink for TerminalCues {
    fn play(&mut self, cue: Cue, volume: f32) {
        let volume = self.sound.scale(volume);
        if volume <= 0.0 {
            return;
        }
        tracing::trace!(cue = cue.name(), volume, "cue");
        eprint!("\x07");
    }
}

enum LiveTimer {
    Tabata(TabataTimer<TerminalCues>),
    Simple(SimpleTimer<TerminalCues>),
}

impl LiveTimer {
    fn timer(&mut self) -> &mut dyn TrainingTimer {
        match self {
            LiveTimer::Tabata(timer) => timer,
            LiveTimer::Simple(timer) => timer,
        }
    }

    /// Stop before saving. A counter that is stopped has done its job;
    /// an interval timer stopped early stays unfinished.
    fn stop(&mut self) -> Option<TimerEvent> {
        match self {
            LiveTimer::Tabata(_) => None,
            LiveTimer::Simple(timer) => timer.finish(),
        }
    }
}

enum Outcome {
    Save,
    Quit,
}

/// Feed events to the run. Returns true when the timer finished.
fn apply(training: &mut ActiveTraining, events: &[TimerEvent]) -> bool {
    for event in events {
        training.handle_event(event);
    }
    events.contains(&TimerEvent::Finished)
}

/// Redraw the status line, prompting for save once the timer is done.
fn report(timer: &mut LiveTimer, finished: bool) {
    render(timer);
    if finished {
        println!("\nTraining complete. Press s to save or q to quit.");
    }
}

fn render(timer: &mut LiveTimer) {
    let snapshot = timer.timer().snapshot();
    let mut line = format!("{:<22} {}", snapshot.phase.label(), snapshot.clock());
    if let Some(name) = &snapshot.exercise_name {
        line.push_str(&format!(
            "  {name} [{}/{}] round {}/{}",
            snapshot.exercise_index + 1,
            snapshot.exercise_count,
            snapshot.round,
            snapshot.rounds.max(1)
        ));
    }
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\r\x1b[2K{line}");
    let _ = stdout.flush();
}

async fn live_run(
    timer: &mut LiveTimer,
    training: &mut ActiveTraining,
) -> std::io::Result<Outcome> {
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let events = timer.timer().start();
    let finished = apply(training, &events);
    report(timer, finished);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = timer.timer().tick();
                let finished = apply(training, &events);
                report(timer, finished);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed, leaving without saving");
                    return Ok(Outcome::Quit);
                };
                let mut finished = false;
                match line.trim() {
                    "p" => {
                        let event = timer.timer().pause();
                        apply(training, event.as_slice());
                    }
                    "r" => {
                        // After a reset the timer is idle and needs a fresh start.
                        let events = match timer.timer().resume() {
                            Some(event) => vec![event],
                            None => timer.timer().start(),
                        };
                        if !events.is_empty() {
                            ticker.reset();
                        }
                        finished = apply(training, &events);
                    }
                    "x" => {
                        let event = timer.timer().reset();
                        ticker.reset();
                        apply(training, &[event]);
                    }
                    "s" => return Ok(Outcome::Save),
                    "q" => return Ok(Outcome::Quit),
                    "" => {}
                    other => {
                        println!("\nunknown command '{other}' (p pause, r resume, x reset, s save, q quit)");
                    }
                }
                report(timer, finished);
            }
        }
    }
}

fn prepare(
    db: &Database,
    card: &Card,
    weights: &[String],
    fields: [(TabataField, Option<String>); 5],
) -> Result<(), Box<dyn std::error::Error>> {
    let default_timer = Config::load_or_default().timer;
    let staged = StagedRun::load(db, TimerConfig::Tabata(default_timer));
    let mut config = match staged.timer_config {
        TimerConfig::Tabata(config) => config,
        TimerConfig::Simple(_) => default_timer,
    };
    for (field, value) in fields {
        if let Some(value) = value {
            config.set_field(field, &value);
        }
    }

    let count = card.exercise_count();
    let mut staged_weights = WeightMap::new();
    for raw in weights {
        let (index, kg) = parse_weight(raw)?;
        if index >= count {
            return Err(ValidationError::OutOfBounds {
                collection: "exercises".into(),
                index,
                len: count,
            }
            .into());
        }
        if !kg.is_finite() || kg < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "weight".into(),
                message: format!("{kg} is not a usable weight"),
            }
            .into());
        }
        staged_weights.insert(index, kg);
    }

    let staged = StagedRun {
        weights: staged_weights,
        timer_config: TimerConfig::Tabata(config),
    };
    staged.stage(db);

    println!("Prepared {}: {}", card.display_title(), config.summary());
    for (index, exercise) in card.training_exercises().iter().enumerate() {
        match staged.weights.get(&index) {
            Some(kg) => println!("  {}. {}  {kg} kg", index + 1, exercise.label()),
            None => println!("  {}. {}", index + 1, exercise.label()),
        }
    }
    Ok(())
}

fn save(
    db: &Database,
    library: &mut Library,
    session: TrainingSession,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Saved session {} ({}, {})",
        session.id,
        session.status.label(),
        session.duration_label()
    );
    library.add_session(session);
    library.try_save(db)?;
    StagedRun::clear(db);
    Ok(())
}

pub fn run(action: TrainAction) -> Result<(), Box<dyn std::error::Error>> {
    let (db, mut library) = open_library()?;

    match action {
        TrainAction::Prepare {
            card_id,
            weights,
            prep,
            work,
            rest,
            rounds,
            rest_between,
        } => {
            let card = find_card(&library, &card_id)?;
            prepare(
                &db,
                card,
                &weights,
                [
                    (TabataField::PrepTime, prep),
                    (TabataField::WorkTime, work),
                    (TabataField::RestTime, rest),
                    (TabataField::Rounds, rounds),
                    (TabataField::RestBetweenExercises, rest_between),
                ],
            )?;
        }
        TrainAction::Run {
            card_id,
            simple,
            initial,
            no_save,
        } => {
            let card = find_card(&library, &card_id)?.clone();
            let config = Config::load_or_default();
            let staged = StagedRun::load(&db, TimerConfig::Tabata(config.timer));
            let cues = TerminalCues {
                sound: config.sound.clone(),
            };

            let (mut timer, timer_config) = match simple {
                Some(kind) => {
                    let simple = SimpleConfig {
                        kind: kind.into(),
                        initial_time: coerce_number(&initial),
                    };
                    (
                        LiveTimer::Simple(SimpleTimer::new(simple, cues)),
                        TimerConfig::Simple(simple),
                    )
                }
                None => {
                    let tabata: TabataConfig = match staged.timer_config {
                        TimerConfig::Tabata(tabata) => tabata,
                        TimerConfig::Simple(_) => config.timer,
                    };
                    (
                        LiveTimer::Tabata(TabataTimer::new(card.training_exercises(), tabata, cues)),
                        TimerConfig::Tabata(tabata),
                    )
                }
            };

            println!("{}: p pause, r resume, x reset, s save, q quit", card.display_title());
            let mut training = ActiveTraining::new(card, staged.weights, timer_config, Utc::now());

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let outcome = runtime.block_on(live_run(&mut timer, &mut training))?;
            println!();

            match outcome {
                Outcome::Quit => println!("Left without saving"),
                Outcome::Save => {
                    if let Some(event) = timer.stop() {
                        training.handle_event(&event);
                    }
                    let session = training.finish(Utc::now());
                    if no_save {
                        println!("{}", serde_json::to_string_pretty(&session)?);
                    } else {
                        save(&db, &mut library, session)?;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_arguments() {
        assert_eq!(parse_weight("0=20").unwrap(), (0, 20.0));
        assert_eq!(parse_weight(" 2 = 15.5 ").unwrap(), (2, 15.5));
        assert!(parse_weight("2").is_err());
        assert!(parse_weight("x=1").is_err());
        assert!(parse_weight("1=heavy").is_err());
    }

    #[test]
    fn counter_kind_maps_to_simple_kind() {
        assert_eq!(SimpleKind::from(CounterKind::Reverse), SimpleKind::Reverse);
        assert_eq!(SimpleKind::from(CounterKind::Normal), SimpleKind::Normal);
    }

    #[test]
    fn stopping_a_counter_finishes_it() {
        let cues = || TerminalCues {
            sound: SoundConfig {
                enabled: false,
                volume: 0,
            },
        };
        let simple = SimpleConfig {
            kind: SimpleKind::Normal,
            initial_time: 0,
        };
        let mut counter = LiveTimer::Simple(SimpleTimer::new(simple, cues()));
        assert_eq!(counter.stop(), Some(TimerEvent::Finished));
        assert_eq!(counter.stop(), None);

        let config = TabataConfig::default();
        let mut tabata = LiveTimer::Tabata(TabataTimer::new(Vec::new(), config, cues()));
        assert_eq!(tabata.stop(), None);
    }

    #[test]
    fn run_that_finishes_on_start_is_reported() {
        let card = Card {
            id: Some("card-empty".into()),
            ..Card::default()
        };
        let config = TabataConfig::default();
        let mut training = ActiveTraining::new(
            card.clone(),
            WeightMap::new(),
            TimerConfig::Tabata(config),
            Utc::now(),
        );
        let mut timer = LiveTimer::Tabata(TabataTimer::new(
            card.training_exercises(),
            config,
            TerminalCues {
                sound: SoundConfig {
                    enabled: false,
                    volume: 0,
                },
            },
        ));

        let events = timer.timer().start();
        assert!(apply(&mut training, &events));
        assert!(training.is_timer_finished());

        timer.timer().reset();
        let events = timer.timer().start();
        assert!(apply(&mut training, &events));
        assert!(!apply(&mut training, &timer.timer().tick()));
    }
}
