//! Habit management commands for the CLI.

use clap::Subcommand;
use habitrail_core::{GoalType, Habit, HabitFilter, HabitPatch, RepetitionPolicy};

use crate::data;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Tag for grouping in reports (default: general)
        #[arg(long, default_value = "general")]
        tag: String,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
        /// Motivation note shown alongside the habit
        #[arg(long)]
        note: Option<String>,
        /// Repetition policy: daily, weekly, or monthly (default: daily)
        #[arg(long, default_value = "daily")]
        repetition: String,
        /// Comma-separated scheduled days (weekdays 0-6 or month days 1-31)
        #[arg(long)]
        days: Option<String>,
        /// Counter goal target; turns the habit into a counter goal
        #[arg(long)]
        goal: Option<f64>,
    },
    /// List habits
    List {
        /// Substring match on name, description, or note
        #[arg(long)]
        search: Option<String>,
        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
        /// List archived habits instead of active ones
        #[arg(long)]
        archived: bool,
        /// List both active and archived habits
        #[arg(long)]
        all: bool,
        /// Sort field, prefixed with - for descending (e.g. -best_streak)
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show one habit
    Show {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Edit {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description (empty string clears it)
        #[arg(long)]
        description: Option<String>,
        /// New motivation note (empty string clears it)
        #[arg(long)]
        note: Option<String>,
        /// New tag
        #[arg(long)]
        tag: Option<String>,
        /// New repetition policy: daily, weekly, or monthly
        #[arg(long)]
        repetition: Option<String>,
        /// Comma-separated scheduled days
        #[arg(long)]
        days: Option<String>,
        /// New goal type: streak or counter
        #[arg(long)]
        goal_type: Option<String>,
        /// New counter goal target
        #[arg(long)]
        goal_value: Option<f64>,
    },
    /// Archive a habit, keeping its history
    Archive {
        /// Habit ID
        id: String,
    },
    /// Restore an archived habit
    Restore {
        /// Habit ID
        id: String,
    },
    /// Delete a habit and its completions
    Remove {
        /// Habit ID
        id: String,
    },
}

fn parse_repetition(value: &str) -> Result<RepetitionPolicy, String> {
    match value {
        "daily" => Ok(RepetitionPolicy::Daily),
        "weekly" => Ok(RepetitionPolicy::Weekly),
        "monthly" => Ok(RepetitionPolicy::Monthly),
        other => Err(format!("unknown repetition policy: {other}")),
    }
}

fn parse_goal_type(value: &str) -> Result<GoalType, String> {
    match value {
        "streak" => Ok(GoalType::Streak),
        "counter" => Ok(GoalType::Counter),
        other => Err(format!("unknown goal type: {other}")),
    }
}

fn parse_days(value: &str) -> Result<Vec<u32>, String> {
    value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid day number: {part}"))
        })
        .collect()
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = data::open_tracker()?;

    match action {
        HabitAction::Add {
            name,
            tag,
            description,
            note,
            repetition,
            days,
            goal,
        } => {
            let mut habit = Habit::new(name, tag);
            habit.description = description;
            habit.motivation_note = note;
            let repetition = parse_repetition(&repetition)?;
            let days = days.as_deref().map(parse_days).transpose()?.unwrap_or_default();
            habit = habit.with_repetition(repetition, days);
            if let Some(goal) = goal {
                habit = habit.with_counter_goal(goal);
            }
            let habit = tracker.add_habit(habit)?;
            data::save(&tracker)?;
            println!("Habit created: {}", habit.id);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List {
            search,
            tag,
            archived,
            all,
            sort,
        } => {
            let mut filter = HabitFilter::new();
            if let Some(term) = search {
                filter = filter.with_search(term);
            }
            if let Some(tag) = tag {
                filter = filter.with_tag(tag);
            }
            if !all {
                filter = filter.with_archived(archived);
            }
            if let Some(sort) = sort {
                filter = filter.with_sort(&sort);
            }
            let habits = tracker.list_habits(&filter)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Show { id } => {
            let habit = tracker.get_habit(&id)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Edit {
            id,
            name,
            description,
            note,
            tag,
            repetition,
            days,
            goal_type,
            goal_value,
        } => {
            let patch = HabitPatch {
                name,
                description,
                motivation_note: note,
                tag,
                repetition: repetition.as_deref().map(parse_repetition).transpose()?,
                specific_days: days.as_deref().map(parse_days).transpose()?,
                goal_type: goal_type.as_deref().map(parse_goal_type).transpose()?,
                goal_value,
            };
            let habit = tracker.edit_habit(&id, patch)?;
            data::save(&tracker)?;
            println!("Habit updated:");
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Archive { id } => {
            tracker.archive_habit(&id)?;
            data::save(&tracker)?;
            println!("Habit archived: {id}");
        }
        HabitAction::Restore { id } => {
            tracker.restore_habit(&id)?;
            data::save(&tracker)?;
            println!("Habit restored: {id}");
        }
        HabitAction::Remove { id } => {
            let removed = tracker.remove_habit(&id)?;
            data::save(&tracker)?;
            println!("Habit removed: {id} ({removed} completions deleted)");
        }
    }
    Ok(())
}
