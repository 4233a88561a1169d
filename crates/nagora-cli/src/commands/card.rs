use std::path::PathBuf;

use clap::Subcommand;
use nagora_core::card::DEFAULT_COLOR;
use nagora_core::{Card, CardSide, Config, Exercise};
use serde::Deserialize;

use super::{find_card, open_library};

#[derive(Subcommand)]
pub enum CardAction {
    /// Add a card
    Add {
        /// Front title
        #[arg(long)]
        title: String,
        /// Front subtitle
        #[arg(long, default_value = "")]
        subtitle: String,
        /// Front accent color
        #[arg(long, default_value = DEFAULT_COLOR)]
        color: String,
        /// Front exercise, repeatable
        #[arg(long = "exercise", value_name = "NAME[:REPS]")]
        exercises: Vec<String>,
        /// Back title
        #[arg(long, default_value = "")]
        back_title: String,
        /// Back subtitle
        #[arg(long, default_value = "")]
        back_subtitle: String,
        /// Back accent color
        #[arg(long, default_value = DEFAULT_COLOR)]
        back_color: String,
        /// Back exercise, repeatable
        #[arg(long = "back-exercise", value_name = "NAME[:REPS]")]
        back_exercises: Vec<String>,
    },
    /// Import cards from a JSON file holding one card or an array of cards
    Import {
        path: PathBuf,
    },
    /// List saved cards
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one card
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Many(Vec<Card>),
    One(Card),
}

/// `"Burpees:10"` -> name and repetitions; no colon means no repetitions.
fn parse_exercise(raw: &str) -> Exercise {
    match raw.split_once(':') {
        Some((name, reps)) if !reps.trim().is_empty() => {
            Exercise::with_repetitions(name.trim(), reps.trim())
        }
        Some((name, _)) => Exercise::new(name.trim()),
        None => Exercise::new(raw.trim()),
    }
}

fn print_side(label: &str, side: &CardSide) {
    if side.title.is_empty() && side.exercises.is_empty() {
        return;
    }
    println!("{label}: {} {}", side.title, side.color);
    if !side.subtitle.is_empty() {
        println!("  {}", side.subtitle);
    }
    for exercise in side.trainable() {
        println!("  - {}", exercise.label());
    }
}

pub fn run(action: CardAction) -> Result<(), Box<dyn std::error::Error>> {
    let (db, mut library) = open_library()?;

    match action {
        CardAction::Add {
            title,
            subtitle,
            color,
            exercises,
            back_title,
            back_subtitle,
            back_color,
            back_exercises,
        } => {
            let card = Card {
                id: None,
                front: CardSide {
                    color,
                    title,
                    subtitle,
                    exercises: exercises.iter().map(|e| parse_exercise(e)).collect(),
                },
                back: CardSide {
                    color: back_color,
                    title: back_title,
                    subtitle: back_subtitle,
                    exercises: back_exercises.iter().map(|e| parse_exercise(e)).collect(),
                },
            };
            let card = library.add_card(card);
            library.try_save(&db)?;
            println!("Card created: {}", card.id.as_deref().unwrap_or_default());
        }
        CardAction::Import { path } => {
            let content = std::fs::read_to_string(&path)?;
            let cards = match serde_json::from_str::<ImportFile>(&content)? {
                ImportFile::Many(cards) => cards,
                ImportFile::One(card) => vec![card],
            };
            let count = cards.len();
            for card in cards {
                library.add_card(card);
            }
            library.try_save(&db)?;
            println!("Imported {count} card(s)");
        }
        CardAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(library.cards())?);
                return Ok(());
            }
            if library.cards().is_empty() {
                println!("No cards yet. Add one with `nagora card add`.");
            }
            for card in library.cards() {
                let id = card.id.as_deref().unwrap_or_default();
                println!(
                    "{id}  {}  {} exercises  {} sessions",
                    card.display_title(),
                    card.exercise_count(),
                    library.session_count(id)
                );
            }
        }
        CardAction::Show { id, json } => {
            let card = find_card(&library, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(card)?);
                return Ok(());
            }
            let timer = Config::load_or_default().timer;
            println!("{}", card.display_title());
            print_side("Front", &card.front);
            print_side("Back", &card.back);
            println!(
                "{} exercises, about {} with {}",
                card.exercise_count(),
                nagora_core::timer::format_clock(
                    u32::try_from(timer.estimated_duration_secs(card.exercise_count()))
                        .unwrap_or(u32::MAX)
                ),
                timer.summary()
            );
            println!("Trained {} time(s)", library.session_count(&id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_argument_forms() {
        assert_eq!(parse_exercise("Squat"), Exercise::new("Squat"));
        assert_eq!(
            parse_exercise("Push-up : 12"),
            Exercise::with_repetitions("Push-up", "12")
        );
        assert_eq!(parse_exercise("Plank:"), Exercise::new("Plank"));
        assert_eq!(
            parse_exercise("Row:3x8"),
            Exercise::with_repetitions("Row", "3x8")
        );
    }

    #[test]
    fn import_accepts_single_card_or_array() {
        let one = r##"{"front":{"color":"#fff","title":"A","subtitle":""},
                      "back":{"color":"#000","title":"","subtitle":""}}"##;
        assert!(matches!(
            serde_json::from_str::<ImportFile>(one).unwrap(),
            ImportFile::One(_)
        ));
        let many = format!("[{one},{one}]");
        match serde_json::from_str::<ImportFile>(&many).unwrap() {
            ImportFile::Many(cards) => assert_eq!(cards.len(), 2),
            ImportFile::One(_) => panic!("expected an array"),
        }
    }
}
