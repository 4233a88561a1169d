//! The personal library: saved cards and recorded sessions.
//!
//! Both collections are append-only and persisted as JSON arrays under fixed
//! keys of a [`KeyValueStore`]. Reads never fail: missing or malformed data
//! loads as an empty collection. Writes that fail are logged and dropped.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::KeyValueStore;
use crate::card::Card;
use crate::error::StorageError;
use crate::session::{TrainingSession, WeightMap};
use crate::timer::TimerConfig;

pub const CARDS_KEY: &str = "trainingCards";
pub const SESSIONS_KEY: &str = "trainingSessions";
pub const WEIGHTS_KEY: &str = "trainingWeights";
pub const TIMER_CONFIG_KEY: &str = "trainingTimerConfig";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Library {
    cards: Vec<Card>,
    sessions: Vec<TrainingSession>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn sessions(&self) -> &[TrainingSession] {
        &self.sessions
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id.as_deref() == Some(id))
    }

    /// Append a card, giving it an id if it has none. Returns the stored card.
    pub fn add_card(&mut self, mut card: Card) -> Card {
        if card.id.is_none() {
            card.id = Some(format!("card-{}", Uuid::new_v4().simple()));
        }
        self.cards.push(card.clone());
        card
    }

    pub fn add_session(&mut self, session: TrainingSession) {
        self.sessions.push(session);
    }

    pub fn sessions_for_card(&self, card_id: &str) -> Vec<&TrainingSession> {
        self.sessions
            .iter()
            .filter(|s| s.card_id == card_id)
            .collect()
    }

    pub fn session_count(&self, card_id: &str) -> usize {
        self.sessions.iter().filter(|s| s.card_id == card_id).count()
    }

    /// Sessions sorted by date, most recent first; optionally for one card.
    pub fn sessions_newest_first(&self, card_id: Option<&str>) -> Vec<&TrainingSession> {
        let mut sessions: Vec<_> = self
            .sessions
            .iter()
            .filter(|s| card_id.map_or(true, |id| s.card_id == id))
            .collect();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        sessions
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Load both collections. Never fails.
    ///
    /// Cards saved without an id are given `card-<millis>-<index>`.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let mut cards: Vec<Card> = read_json(store, CARDS_KEY).unwrap_or_default();
        let stamp = Utc::now().timestamp_millis();
        for (index, card) in cards.iter_mut().enumerate() {
            if card.id.is_none() {
                card.id = Some(format!("card-{stamp}-{index}"));
            }
        }
        let sessions = read_json(store, SESSIONS_KEY).unwrap_or_default();
        Self { cards, sessions }
    }

    /// Write both collections.
    pub fn try_save(&self, store: &impl KeyValueStore) -> Result<(), StorageError> {
        write_json(store, CARDS_KEY, &self.cards)?;
        write_json(store, SESSIONS_KEY, &self.sessions)
    }

    /// Write both collections, logging instead of failing.
    pub fn save(&self, store: &impl KeyValueStore) {
        if let Err(e) = self.try_save(store) {
            tracing::warn!(error = %e, "library not persisted");
        }
    }
}

/// Weights and timer settings chosen while preparing a run, kept under
/// their own keys until the run is saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagedRun {
    pub weights: WeightMap,
    pub timer_config: TimerConfig,
}

impl StagedRun {
    /// Read the staged run, falling back to no weights and `default_config`.
    pub fn load(store: &impl KeyValueStore, default_config: TimerConfig) -> Self {
        Self {
            weights: read_json(store, WEIGHTS_KEY).unwrap_or_default(),
            timer_config: read_json(store, TIMER_CONFIG_KEY).unwrap_or(default_config),
        }
    }

    pub fn stage(&self, store: &impl KeyValueStore) {
        let result = write_json(store, WEIGHTS_KEY, &self.weights)
            .and_then(|()| write_json(store, TIMER_CONFIG_KEY, &self.timer_config));
        if let Err(e) = result {
            tracing::warn!(error = %e, "staged run not persisted");
        }
    }

    pub fn clear(store: &impl KeyValueStore) {
        for key in [WEIGHTS_KEY, TIMER_CONFIG_KEY] {
            if let Err(e) = store.remove(key) {
                tracing::warn!(key, error = %e, "staged run key not cleared");
            }
        }
    }
}

fn read_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage read failed");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed stored value");
            None
        }
    }
}

fn write_json<T: Serialize + ?Sized>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)
        .map_err(|e| StorageError::QueryFailed(format!("cannot serialize {key}: {e}")))?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardSide, Exercise};
    use crate::session::{ExerciseWithWeight, SessionStatus};
    use crate::storage::MemoryStore;
    use crate::timer::{SimpleConfig, SimpleKind};
    use chrono::{DateTime, TimeZone};

    fn card(title: &str) -> Card {
        Card {
            id: None,
            front: CardSide {
                title: title.into(),
                exercises: vec![Exercise::new("Squat")],
                ..CardSide::default()
            },
            back: CardSide::default(),
        }
    }

    fn session(id: &str, card_id: &str, date: DateTime<Utc>) -> TrainingSession {
        TrainingSession {
            id: id.into(),
            card_id: card_id.into(),
            date,
            total_time: 90,
            exercises: vec![ExerciseWithWeight::new(Exercise::new("Squat"), Some(40.0))],
            timer_config: TimerConfig::default(),
            status: SessionStatus::Completed,
        }
    }

    #[test]
    fn add_card_assigns_missing_id_only() {
        let mut library = Library::new();
        let stored = library.add_card(card("Legs"));
        let id = stored.id.clone().unwrap();
        assert!(id.starts_with("card-"));
        assert_eq!(library.card(&id), Some(&stored));

        let mut named = card("Arms");
        named.id = Some("card-fixed".into());
        assert_eq!(library.add_card(named).id.as_deref(), Some("card-fixed"));
        assert_eq!(library.cards().len(), 2);
    }

    #[test]
    fn sessions_are_looked_up_by_card() {
        let mut library = Library::new();
        let day = |d| Utc.with_ymd_and_hms(2026, 5, d, 8, 0, 0).unwrap();
        library.add_session(session("s1", "a", day(1)));
        library.add_session(session("s2", "b", day(2)));
        library.add_session(session("s3", "a", day(3)));

        assert_eq!(library.session_count("a"), 2);
        assert_eq!(library.session_count("missing"), 0);
        let ids: Vec<_> = library.sessions_for_card("a").iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s3"]);
        let newest: Vec<_> = library
            .sessions_newest_first(None)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(newest, vec!["s3", "s2", "s1"]);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let store = MemoryStore::new();
        let mut library = Library::new();
        let stored = library.add_card(card("Legs"));
        let date = Utc.with_ymd_and_hms(2026, 1, 15, 19, 45, 12).unwrap();
        library.add_session(session("s1", stored.id.as_deref().unwrap(), date));
        library.try_save(&store).unwrap();

        let loaded = Library::load(&store);
        assert_eq!(loaded.cards(), library.cards());
        assert_eq!(loaded.sessions()[0].date, date);
    }

    #[test]
    fn malformed_data_loads_empty() {
        let store = MemoryStore::new();
        store.set(CARDS_KEY, "{not json").unwrap();
        store.set(SESSIONS_KEY, r#"{"an": "object"}"#).unwrap();
        let library = Library::load(&store);
        assert!(library.cards().is_empty());
        assert!(library.sessions().is_empty());
    }

    #[test]
    fn unavailable_storage_is_swallowed() {
        let store = MemoryStore::unavailable();
        let mut library = Library::load(&store);
        library.add_card(card("Legs"));
        library.save(&store);
        assert!(library.try_save(&store).is_err());
    }

    #[test]
    fn stored_cards_without_ids_get_indexed_ids() {
        let store = MemoryStore::new();
        write_json(&store, CARDS_KEY, &vec![card("A"), card("B")]).unwrap();
        let library = Library::load(&store);
        let ids: Vec<_> = library
            .cards()
            .iter()
            .map(|c| c.id.clone().unwrap())
            .collect();
        assert!(ids[0].starts_with("card-") && ids[0].ends_with("-0"));
        assert!(ids[1].ends_with("-1"));
    }

    #[test]
    fn staged_run_roundtrip_and_clear() {
        let store = MemoryStore::new();
        let default = TimerConfig::default();
        assert_eq!(StagedRun::load(&store, default), StagedRun::default());

        let staged = StagedRun {
            weights: [(0, 20.0), (2, 15.0)].into_iter().collect(),
            timer_config: TimerConfig::Simple(SimpleConfig {
                kind: SimpleKind::Normal,
                initial_time: 0,
            }),
        };
        staged.stage(&store);
        assert_eq!(
            store.get(WEIGHTS_KEY).unwrap().as_deref(),
            Some(r#"{"0":20.0,"2":15.0}"#)
        );
        assert_eq!(StagedRun::load(&store, default), staged);

        StagedRun::clear(&store);
        assert!(store.get(WEIGHTS_KEY).unwrap().is_none());
        assert!(store.get(TIMER_CONFIG_KEY).unwrap().is_none());
    }
}
