//! # Nagora Core Library
//!
//! Core logic for Nagora, a trainer built around double-sided exercise
//! cards. Front ends (the `nagora` CLI) are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: tick-driven Tabata state machine and a simple counter; audible
//!   cues go through an injected [`CueSink`]
//! - **Session**: turns a run into an immutable [`TrainingSession`]
//! - **Storage**: the append-only [`Library`] over a key/value store (SQLite on
//!   disk) and TOML-based [`Config`]
//! - **Stats**: the 53-week [`ContributionGraph`] and recent-activity feed
//!
//! ## Key Components
//!
//! - [`TabataTimer`]: interval timer state machine
//! - [`ActiveTraining`]: bookkeeping for a run in progress
//! - [`Library`]: cards and sessions persistence

pub mod card;
pub mod error;
pub mod events;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use card::{Card, CardSide, Exercise};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::TimerEvent;
pub use session::{
    record_session, ActiveTraining, ExerciseWithWeight, SessionStatus, TrainingSession, WeightMap,
};
pub use stats::{recent_activity, ContributionGraph, DayBucket};
pub use storage::{Config, Database, KeyValueStore, Library, MemoryStore, StagedRun};
pub use timer::{
    Cue, CueSink, Phase, RunState, SilentCues, SimpleConfig, SimpleKind, SimpleTimer, TabataConfig,
    TabataTimer, TimerConfig, TimerSnapshot, TrainingTimer,
};
