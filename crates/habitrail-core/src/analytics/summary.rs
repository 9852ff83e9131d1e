//! Per-habit summary rows over a trailing window, one row per active
//! habit in input order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::{best_worst_day, success_rate, Period};
use crate::calendar;
use crate::habit::{CompletionRecord, Habit};
use crate::streak;

/// Compact cross-habit row used by the summary listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitSummary {
    pub habit_id: String,
    pub habit_name: String,
    /// Satisfied active days over active days within the window
    pub success_rate: f64,
    /// Weekday indices, -1 when the window holds no records
    pub best_day_of_week: i32,
    pub worst_day_of_week: i32,
    /// The stored best streak
    pub longest_streak: u32,
    /// Satisfied records within the window
    pub total_completions: u32,
    /// Completions averaged over the recorded span, in weeks
    pub average_completions_per_week: f64,
    pub current_counter: f64,
}

/// Summarize every active habit over the window ending at `today`.
pub fn habits_summary(
    habits: &[Habit],
    completions: &[CompletionRecord],
    period: Period,
    today: NaiveDate,
) -> Vec<HabitSummary> {
    let (start, end) = period.window_ending(today);

    habits
        .iter()
        .filter(|h| !h.archived)
        .map(|habit| {
            let satisfied: Vec<NaiveDate> = completions
                .iter()
                .filter(|r| r.habit_id == habit.id && r.date >= start && r.date <= end)
                .filter(|r| streak::is_satisfied(habit, Some(r)))
                .map(|r| r.date)
                .collect();

            let total = satisfied.len() as u32;
            let average_per_week = match (satisfied.iter().min(), satisfied.iter().max()) {
                (Some(&first), Some(&last)) => {
                    let span_days = calendar::gap_days(first, last) + 1;
                    let weeks = (span_days as f64 / 7.0).max(1.0);
                    total as f64 / weeks
                }
                _ => 0.0,
            };

            let (best_day, worst_day) = best_worst_day(habit, completions, start, end);

            HabitSummary {
                habit_id: habit.id.clone(),
                habit_name: habit.name.clone(),
                success_rate: success_rate(habit, completions, start, end),
                best_day_of_week: best_day,
                worst_day_of_week: worst_day,
                longest_streak: habit.best_streak,
                total_completions: total,
                average_completions_per_week: average_per_week,
                current_counter: habit.current_counter,
            }
        })
        .collect()
}
