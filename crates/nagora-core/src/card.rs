//! Exercise cards.
//!
//! A card has two sides, each with its own header and exercise list. For
//! training purposes the sides are read front-then-back as one ordered list,
//! skipping rows whose name is blank.

use serde::{Deserialize, Serialize};

/// Accent color new cards start with.
pub const DEFAULT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<String>,
}

impl Exercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repetitions: None,
        }
    }

    pub fn with_repetitions(name: impl Into<String>, repetitions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repetitions: Some(repetitions.into()),
        }
    }

    /// Rows left empty in the editor are not trained.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// `"Burpees (10)"` when repetitions are set, otherwise just the name.
    pub fn label(&self) -> String {
        match self.repetitions.as_deref().filter(|r| !r.is_empty()) {
            Some(reps) => format!("{} ({reps})", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSide {
    pub color: String,
    pub title: String,
    pub subtitle: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Default for CardSide {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.into(),
            title: String::new(),
            subtitle: String::new(),
            exercises: Vec::new(),
        }
    }
}

impl CardSide {
    pub fn trainable(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter().filter(|e| !e.is_blank())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub front: CardSide,
    pub back: CardSide,
}

impl Card {
    /// Front exercises followed by back exercises, blank rows removed.
    pub fn training_exercises(&self) -> Vec<Exercise> {
        self.front
            .trainable()
            .chain(self.back.trainable())
            .cloned()
            .collect()
    }

    pub fn exercise_count(&self) -> usize {
        self.front.trainable().count() + self.back.trainable().count()
    }

    /// Title shown in lists; falls back when the front title is empty.
    pub fn display_title(&self) -> &str {
        let title = self.front.title.trim();
        if title.is_empty() {
            "Untitled workout"
        } else {
            title
        }
    }
}
