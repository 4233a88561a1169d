//! Statistics over recorded training sessions.

mod contribution;

pub use contribution::{
    intensity_level, recent_activity, window_start, ContributionGraph, DayBucket, MonthLabel,
    RecentActivity, WEEKS, WINDOW_DAYS,
};
