//! Completion recording commands for the CLI.

use std::fs;
use std::path::PathBuf;

use clap::Subcommand;
use habitrail_core::{calendar, CompletionInput};

use crate::data;

#[derive(Subcommand)]
pub enum RecordAction {
    /// Record a completion for a habit
    Add {
        /// Habit ID
        habit_id: String,
        /// Date to record (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Recorded value for counter habits
        #[arg(long)]
        value: Option<f64>,
        /// Mark the day as missed instead of completed
        #[arg(long)]
        missed: bool,
    },
    /// Record a batch of completions from a JSON file
    Batch {
        /// Path to a JSON array of completion inputs
        file: PathBuf,
    },
    /// Remove a completion record
    Remove {
        /// Completion record ID
        id: String,
    },
    /// List completions for a habit
    List {
        /// Habit ID
        habit_id: String,
    },
}

pub fn run(action: RecordAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = data::open_tracker()?;

    match action {
        RecordAction::Add {
            habit_id,
            date,
            value,
            missed,
        } => {
            let date = match date {
                Some(raw) => calendar::parse_date(&raw)?,
                None => calendar::today(),
            };
            let record = tracker.record_completion(&habit_id, date, !missed, value)?;
            data::save(&tracker)?;
            println!("Completion recorded: {}", record.id);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        RecordAction::Batch { file } => {
            let content = fs::read_to_string(&file)?;
            let inputs: Vec<CompletionInput> = serde_json::from_str(&content)?;
            let records = tracker.record_completions(&inputs)?;
            data::save(&tracker)?;
            println!("Recorded {} completions", records.len());
        }
        RecordAction::Remove { id } => {
            tracker.remove_completion(&id)?;
            data::save(&tracker)?;
            println!("Completion removed: {id}");
        }
        RecordAction::List { habit_id } => {
            let records = tracker.list_completions(&habit_id)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
