//! Training contribution graph.
//!
//! Buckets sessions per calendar day over a fixed window of 53
//! Monday-aligned weeks ending with the current week, and grades each day
//! relative to the busiest day in the window.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::session::TrainingSession;

pub const WEEKS: usize = 53;
pub const WINDOW_DAYS: usize = WEEKS * 7;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One day of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub count: u32,
    /// 0 ..= 4, see [`intensity_level`].
    pub level: u8,
}

impl DayBucket {
    /// Character for terminal rendering.
    pub fn heat_char(&self) -> char {
        match self.level {
            0 => '·',
            1 => '░',
            2 => '▒',
            3 => '▓',
            _ => '█',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLabel {
    pub month: &'static str,
    pub week_index: usize,
}

/// A row of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivity<'a> {
    pub session: &'a TrainingSession,
    pub card_name: String,
    pub duration: String,
}

/// Dense per-day session counts for the trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionGraph {
    pub start: NaiveDate,
    pub days: Vec<DayBucket>,
    /// Busiest day's count, at least 1.
    pub max_count: u32,
    /// Sessions that fell inside the window.
    pub total_sessions: u32,
}

/// Grade a day's count against the window maximum.
pub fn intensity_level(count: u32, max_count: u32) -> u8 {
    if count == 0 {
        return 0;
    }
    let ratio = f64::from(count) / f64::from(max_count.max(1));
    if ratio < 0.25 {
        1
    } else if ratio < 0.5 {
        2
    } else if ratio < 0.75 {
        3
    } else {
        4
    }
}

/// Monday of the first week in the window that ends with `today`'s week.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    monday - Days::new(((WEEKS - 1) * 7) as u64)
}

impl ContributionGraph {
    /// Build the graph for the window containing `today`, reading session
    /// dates in the time zone `tz`.
    pub fn build<Tz: TimeZone>(sessions: &[TrainingSession], today: NaiveDate, tz: &Tz) -> Self {
        let start = window_start(today);

        let mut counts: HashMap<NaiveDate, u32> = HashMap::new();
        for session in sessions {
            let day = session.date.with_timezone(tz).date_naive();
            *counts.entry(day).or_default() += 1;
        }

        let dates: Vec<NaiveDate> = start.iter_days().take(WINDOW_DAYS).collect();
        let total_sessions = dates.iter().filter_map(|d| counts.get(d)).sum();
        let max_count = dates
            .iter()
            .filter_map(|d| counts.get(d))
            .copied()
            .max()
            .unwrap_or(0)
            .max(1);

        let days = dates
            .into_iter()
            .map(|date| {
                let count = counts.get(&date).copied().unwrap_or(0);
                DayBucket {
                    date,
                    count,
                    level: intensity_level(count, max_count),
                }
            })
            .collect();

        Self {
            start,
            days,
            max_count,
            total_sessions,
        }
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayBucket> {
        let offset = (date - self.start).num_days();
        usize::try_from(offset).ok().and_then(|i| self.days.get(i))
    }

    /// Days with at least one session.
    pub fn active_days(&self) -> impl Iterator<Item = &DayBucket> {
        self.days.iter().filter(|d| d.count > 0)
    }

    /// Week columns, Monday first.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayBucket]> {
        self.days.chunks(7)
    }

    /// A label for each month at the first week whose Monday falls in it.
    pub fn month_labels(&self) -> Vec<MonthLabel> {
        let mut seen = [false; 12];
        let mut labels = Vec::new();
        for (week_index, week) in self.weeks().enumerate() {
            let Some(first) = week.first() else { continue };
            let month = first.date.month0() as usize;
            if !seen[month] {
                seen[month] = true;
                labels.push(MonthLabel {
                    month: MONTH_NAMES[month],
                    week_index,
                });
            }
        }
        labels
    }

    /// Render as seven text rows (Mon..Sun) of heat characters.
    pub fn render_rows(&self) -> Vec<String> {
        const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        DAY_NAMES
            .iter()
            .enumerate()
            .map(|(row, name)| {
                let cells: String = self
                    .weeks()
                    .filter_map(|week| week.get(row))
                    .map(DayBucket::heat_char)
                    .collect();
                format!("{name} {cells}")
            })
            .collect()
    }
}

/// The `limit` most recent sessions, newest first, with their card's title.
pub fn recent_activity<'a>(
    sessions: &'a [TrainingSession],
    cards: &[Card],
    limit: usize,
) -> Vec<RecentActivity<'a>> {
    let mut sorted: Vec<&TrainingSession> = sessions.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
        .into_iter()
        .take(limit)
        .map(|session| {
            let card_name = cards
                .iter()
                .find(|c| c.id.as_deref() == Some(session.card_id.as_str()))
                .map(|c| c.display_title().to_string())
                .unwrap_or_else(|| "Untitled workout".to_string());
            RecentActivity {
                session,
                card_name,
                duration: session.duration_label(),
            }
        })
        .collect()
}
