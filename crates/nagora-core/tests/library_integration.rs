//! End-to-end tests over the on-disk library.
//!
//! This test file verifies:
//! - Session dates survive a SQLite round trip exactly
//! - A prepared run flows through timer, recorder and library
//! - Staged weights are cleared once the run is saved

use chrono::{DateTime, TimeZone, Utc};
use nagora_core::{
    ActiveTraining, Card, CardSide, Database, Exercise, KeyValueStore, Library, SessionStatus,
    SilentCues, StagedRun, TabataConfig, TabataTimer, TimerConfig, TimerEvent,
};
use tempfile::TempDir;

fn leg_day() -> Card {
    Card {
        id: None,
        front: CardSide {
            title: "Leg day".into(),
            exercises: vec![
                Exercise::with_repetitions("Squat", "10"),
                Exercise::new("  "),
                Exercise::new("Lunge"),
            ],
            ..CardSide::default()
        },
        back: CardSide {
            exercises: vec![Exercise::new("Calf raise")],
            ..CardSide::default()
        },
    }
}

fn quick_config() -> TabataConfig {
    TabataConfig {
        prep_time: 1,
        work_time: 2,
        rest_time: 1,
        rounds: 2,
        rest_between_exercises: 1,
    }
}

#[test]
fn session_date_survives_database_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nagora.db");
    let date: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 3, 29, 23, 59, 58).unwrap()
        + chrono::Duration::milliseconds(417);

    let mut library = Library::new();
    let card = library.add_card(leg_day());
    let mut run = ActiveTraining::new(card, Default::default(), TimerConfig::default(), date);
    run.set_weight(0, 60.0).unwrap();
    library.add_session(run.finish(date + chrono::Duration::seconds(42)));

    {
        let db = Database::open_at(&path).unwrap();
        library.try_save(&db).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let loaded = Library::load(&db);
    let session = &loaded.sessions()[0];
    assert_eq!(session.date, date + chrono::Duration::seconds(42));
    assert_eq!(session.total_time, 42);
    assert_eq!(session.exercises.len(), 3);
    assert_eq!(session.exercises[0].weight, Some(60.0));
    assert_eq!(session.exercises[1].weight, None);
    assert_eq!(loaded.cards(), library.cards());
}

#[test]
fn prepared_run_is_recorded_and_staging_cleared() {
    let dir = TempDir::new().unwrap();
    let db = Database::open_at(&dir.path().join("nagora.db")).unwrap();

    let mut library = Library::load(&db);
    let card = library.add_card(leg_day());
    library.save(&db);

    // Prepare: pick weights and timer settings.
    let staged = StagedRun {
        weights: [(0, 40.0), (2, 12.5)].into_iter().collect(),
        timer_config: TimerConfig::Tabata(quick_config()),
    };
    staged.stage(&db);

    // Run: drive the timer to the end, feeding every event to the run.
    let staged = StagedRun::load(&db, TimerConfig::default());
    let TimerConfig::Tabata(config) = staged.timer_config else {
        panic!("expected tabata settings");
    };
    let started = Utc.with_ymd_and_hms(2026, 10, 16, 7, 0, 0).unwrap();
    let mut run = ActiveTraining::new(card.clone(), staged.weights, staged.timer_config, started);
    let mut timer = TabataTimer::new(card.training_exercises(), config, SilentCues);

    let mut events: Vec<TimerEvent> = timer.start();
    let mut seconds = 0;
    while !run.is_timer_finished() {
        for event in &events {
            run.handle_event(event);
        }
        events = timer.tick();
        seconds += 1;
        assert!(seconds < 1_000);
    }
    assert_eq!(run.completed().len(), 3);

    // Save.
    let elapsed = config.estimated_duration_secs(3) as i64;
    let session = run.finish(started + chrono::Duration::seconds(elapsed));
    library.add_session(session);
    library.try_save(&db).unwrap();
    StagedRun::clear(&db);

    let reloaded = Library::load(&db);
    let card_id = card.id.as_deref().unwrap();
    assert_eq!(reloaded.session_count(card_id), 1);
    let session = &reloaded.sessions()[0];
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.total_time, elapsed as u64);
    let weights: Vec<_> = session.exercises.iter().map(|e| e.weight).collect();
    assert_eq!(weights, vec![Some(40.0), None, Some(12.5)]);
    assert_eq!(session.exercises[0].repetitions.as_deref(), Some("10"));

    assert!(db.get("trainingWeights").unwrap().is_none());
    assert_eq!(
        StagedRun::load(&db, TimerConfig::default()),
        StagedRun::default()
    );
}

#[test]
fn abandoned_run_is_partial() {
    let card = Card {
        id: Some("card-abandon".into()),
        ..leg_day()
    };
    let started = Utc::now();
    let mut run = ActiveTraining::new(
        card.clone(),
        Default::default(),
        TimerConfig::Tabata(quick_config()),
        started,
    );
    let mut timer = TabataTimer::new(card.training_exercises(), quick_config(), SilentCues);
    for event in timer.start() {
        run.handle_event(&event);
    }
    // prep 1 + (2 + 1) * 2 rounds: the first exercise is done after 7 ticks.
    for _ in 0..7 {
        for event in timer.tick() {
            run.handle_event(&event);
        }
    }
    assert_eq!(run.completed().iter().copied().collect::<Vec<_>>(), vec![0]);

    let session = run.finish(started);
    assert_eq!(session.status, SessionStatus::Partial);
    assert_eq!(session.card_id, "card-abandon");
}
