use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use super::{ExerciseWithWeight, SessionStatus, TrainingSession, UNKNOWN_CARD_ID};
use crate::card::Card;
use crate::timer::TimerConfig;

/// Weights keyed by training exercise index. Sparse: most exercises have none.
pub type WeightMap = BTreeMap<usize, f64>;

/// Turn a finished or abandoned run into a session record.
///
/// The session lists every training exercise of the card in order with the
/// weight entered for its index, if any. It is `completed` only when every
/// exercise index was reported complete by the timer; a card without
/// exercises is trivially complete.
pub fn record_session(
    card: &Card,
    weights: &WeightMap,
    timer_config: TimerConfig,
    completed: &BTreeSet<usize>,
    elapsed_secs: u64,
    now: DateTime<Utc>,
) -> TrainingSession {
    let exercises: Vec<_> = card
        .training_exercises()
        .into_iter()
        .enumerate()
        .map(|(index, exercise)| ExerciseWithWeight::new(exercise, weights.get(&index).copied()))
        .collect();

    let status = if completed.len() == exercises.len() {
        SessionStatus::Completed
    } else {
        SessionStatus::Partial
    };

    TrainingSession {
        id: format!("session-{}", now.timestamp_millis()),
        card_id: card
            .id
            .clone()
            .unwrap_or_else(|| UNKNOWN_CARD_ID.to_string()),
        date: now,
        total_time: elapsed_secs,
        exercises,
        timer_config,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardSide, Exercise};
    use chrono::TimeZone;

    fn card_with(front: &[&str], back: &[&str]) -> Card {
        let side = |names: &[&str]| CardSide {
            exercises: names.iter().map(|n| Exercise::new(*n)).collect(),
            ..CardSide::default()
        };
        Card {
            id: Some("card-7".into()),
            front: side(front),
            back: side(back),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 18, 30, 0).unwrap()
    }

    fn record(card: &Card, weights: &WeightMap, completed: &[usize], elapsed: u64) -> TrainingSession {
        let completed: BTreeSet<_> = completed.iter().copied().collect();
        record_session(card, weights, TimerConfig::default(), &completed, elapsed, now())
    }

    #[test]
    fn all_completed_is_completed() {
        let card = card_with(&["a", "b", "c"], &["d", "e"]);
        let session = record(&card, &WeightMap::new(), &[0, 1, 2, 3, 4], 300);
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.exercises.len(), 5);
    }

    #[test]
    fn some_completed_is_partial() {
        let card = card_with(&["a", "b", "c"], &["d", "e"]);
        let session = record(&card, &WeightMap::new(), &[0, 1, 2], 120);
        assert_eq!(session.status, SessionStatus::Partial);
    }

    #[test]
    fn no_exercises_is_vacuously_completed() {
        let card = card_with(&["", "  "], &[]);
        let session = record(&card, &WeightMap::new(), &[], 0);
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.exercises.is_empty());
    }

    #[test]
    fn sparse_weights_stay_absent() {
        let card = card_with(&["Squat", "Row"], &["Press"]);
        let weights: WeightMap = [(0, 20.0), (2, 15.0)].into_iter().collect();
        let session = record(&card, &weights, &[], 60);
        let recorded: Vec<_> = session.exercises.iter().map(|e| e.weight).collect();
        assert_eq!(recorded, vec![Some(20.0), None, Some(15.0)]);
    }

    #[test]
    fn back_weights_use_offset_indices() {
        let card = card_with(&["Squat", ""], &["Press"]);
        let weights: WeightMap = [(1, 12.5)].into_iter().collect();
        let session = record(&card, &weights, &[], 60);
        assert_eq!(session.exercises[1].name, "Press");
        assert_eq!(session.exercises[1].weight, Some(12.5));
    }

    #[test]
    fn identity_comes_from_card_and_clock() {
        let mut card = card_with(&["a"], &[]);
        let session = record(&card, &WeightMap::new(), &[], 61);
        assert_eq!(session.id, format!("session-{}", now().timestamp_millis()));
        assert_eq!(session.card_id, "card-7");
        assert_eq!(session.date, now());
        assert_eq!(session.duration_label(), "1m 1s");

        card.id = None;
        let session = record(&card, &WeightMap::new(), &[], 9);
        assert_eq!(session.card_id, UNKNOWN_CARD_ID);
        assert_eq!(session.duration_label(), "9s");
    }

    #[test]
    fn absent_weight_is_omitted_from_json() {
        let card = card_with(&["Squat", "Row"], &[]);
        let weights: WeightMap = [(0, 20.0)].into_iter().collect();
        let session = record(&card, &weights, &[], 60);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["exercises"][0]["weight"], 20.0);
        assert!(json["exercises"][1].get("weight").is_none());
        assert_eq!(json["cardId"], "card-7");
        assert_eq!(json["status"], "partial");
    }
}
