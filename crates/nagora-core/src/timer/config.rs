use serde::{Deserialize, Serialize};

/// Interval settings for a Tabata-style run. Durations are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabataConfig {
    pub prep_time: u32,
    pub work_time: u32,
    pub rest_time: u32,
    pub rounds: u32,
    pub rest_between_exercises: u32,
}

impl Default for TabataConfig {
    fn default() -> Self {
        Self {
            prep_time: 5,
            work_time: 20,
            rest_time: 10,
            rounds: 1,
            rest_between_exercises: 10,
        }
    }
}

/// Editable fields of [`TabataConfig`], as named in forms and on the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabataField {
    PrepTime,
    WorkTime,
    RestTime,
    Rounds,
    RestBetweenExercises,
}

impl TabataConfig {
    /// A zero round count still runs every exercise once.
    pub fn effective_rounds(&self) -> u32 {
        self.rounds.max(1)
    }

    /// Update one field from raw text input. Never fails; see [`coerce_number`].
    pub fn set_field(&mut self, field: TabataField, input: &str) {
        let value = coerce_number(input);
        match field {
            TabataField::PrepTime => self.prep_time = value,
            TabataField::WorkTime => self.work_time = value,
            TabataField::RestTime => self.rest_time = value,
            TabataField::Rounds => self.rounds = value,
            TabataField::RestBetweenExercises => self.rest_between_exercises = value,
        }
    }

    /// Expected length of a full run over `exercise_count` exercises,
    /// without the trailing rest after the last one.
    pub fn estimated_duration_secs(&self, exercise_count: usize) -> u64 {
        if exercise_count == 0 {
            return 0;
        }
        let n = exercise_count as u64;
        let per_round = u64::from(self.work_time) + u64::from(self.rest_time);
        let per_exercise = u64::from(self.prep_time) + per_round * u64::from(self.effective_rounds());
        per_exercise * n + u64::from(self.rest_between_exercises) * (n - 1)
    }

    /// `"20s work / 10s rest × 3 rounds"`.
    pub fn summary(&self) -> String {
        format!(
            "{}s work / {}s rest × {} rounds",
            self.work_time, self.rest_time, self.rounds
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleKind {
    /// Counts up with no end.
    Normal,
    /// Counts down to zero.
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleConfig {
    #[serde(rename = "type")]
    pub kind: SimpleKind,
    pub initial_time: u32,
}

/// Timer settings chosen once per run.
///
/// Stored untagged so that Tabata settings keep their flat
/// `{prepTime, workTime, ...}` shape in persisted sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimerConfig {
    Tabata(TabataConfig),
    Simple(SimpleConfig),
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig::Tabata(TabataConfig::default())
    }
}

impl From<TabataConfig> for TimerConfig {
    fn from(config: TabataConfig) -> Self {
        TimerConfig::Tabata(config)
    }
}

impl From<SimpleConfig> for TimerConfig {
    fn from(config: SimpleConfig) -> Self {
        TimerConfig::Simple(config)
    }
}

/// Coerce free-form numeric input the way a number field does: leading digits
/// are taken, anything else (empty, non-numeric, negative) becomes 0.
pub fn coerce_number(input: &str) -> u32 {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(if digits.is_empty() { 0 } else { u32::MAX })
}
