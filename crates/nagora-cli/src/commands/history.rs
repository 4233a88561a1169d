use chrono::Local;
use clap::Subcommand;
use nagora_core::stats::WEEKS;
use nagora_core::{recent_activity, Config, ContributionGraph, TrainingSession};

use super::open_library;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, newest first
    List {
        /// Only sessions of this card
        #[arg(long)]
        card: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the contribution graph for the last 53 weeks
    Graph {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the most recent sessions
    Recent {
        /// Number of sessions (defaults to history.recent_limit)
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn local_date(session: &TrainingSession) -> String {
    session
        .date
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Month names positioned over their week columns.
fn month_header(graph: &ContributionGraph) -> String {
    let mut header = vec![' '; WEEKS];
    let mut next_free = 0;
    for label in graph.month_labels() {
        if label.week_index < next_free {
            continue;
        }
        for (offset, ch) in label.month.chars().enumerate() {
            if let Some(slot) = header.get_mut(label.week_index + offset) {
                *slot = ch;
            }
        }
        next_free = label.week_index + label.month.len() + 1;
    }
    let header: String = header.into_iter().collect();
    format!("    {}", header.trim_end())
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let (_db, library) = open_library()?;

    match action {
        HistoryAction::List { card, json } => {
            let sessions = library.sessions_newest_first(card.as_deref());
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
                return Ok(());
            }
            if sessions.is_empty() {
                println!("No sessions recorded");
            }
            for session in sessions {
                let title = library
                    .card(&session.card_id)
                    .map_or("Untitled workout", |c| c.display_title());
                println!(
                    "{}  {}  {}  {}  {}",
                    session.id,
                    local_date(session),
                    title,
                    session.duration_label(),
                    session.status.label()
                );
            }
        }
        HistoryAction::Graph { json } => {
            let today = Local::now().date_naive();
            let graph = ContributionGraph::build(library.sessions(), today, &Local);
            if json {
                println!("{}", serde_json::to_string_pretty(&graph)?);
                return Ok(());
            }
            println!("{}", month_header(&graph));
            for row in graph.render_rows() {
                println!("{row}");
            }
            println!(
                "{} sessions on {} days in the last year",
                graph.total_sessions,
                graph.active_days().count()
            );
        }
        HistoryAction::Recent { limit } => {
            let limit = limit.unwrap_or_else(|| Config::load_or_default().history.recent_limit);
            let recent = recent_activity(library.sessions(), library.cards(), limit);
            if recent.is_empty() {
                println!("No sessions recorded");
            }
            for activity in recent {
                println!(
                    "{}  {}  {}",
                    local_date(activity.session),
                    activity.card_name,
                    activity.duration
                );
            }
        }
    }
    Ok(())
}
