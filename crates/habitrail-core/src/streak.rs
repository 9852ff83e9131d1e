//! Streak engine: turns a habit's sparse completion history into streak
//! counts.
//!
//! Semantics:
//! - A day is "satisfied" per the goal type: streak goals need the
//!   completed flag, counter goals need a recorded value at or above the
//!   habit's goal value.
//! - Gap detection walks *recorded* dates only. Days with no record are
//!   absent from the status map, not implicitly false.
//! - Between consecutive recordings, a calendar gap larger than the
//!   policy tolerance (daily 1, weekly 7, monthly 31) breaks the run.
//!   The tolerance is a loose envelope and does not consult the habit's
//!   `specific_days` schedule.
//! - Counter streaks always use the strict 1-day gap, whatever the
//!   repetition policy.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::calendar;
use crate::habit::{CompletionRecord, GoalType, Habit, RepetitionPolicy};

/// Derived streak state for one habit, produced by [`recompute`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreakSummary {
    /// Streak ending at the most recent recording.
    pub current_streak: u32,
    /// Longest run ever observed, never below the previous best.
    pub best_streak: u32,
    /// Today's recorded value for counter goals, 0 otherwise.
    pub current_counter: f64,
}

fn meets_counter_goal(record: &CompletionRecord, goal_value: f64) -> bool {
    record.completed && record.value.is_some_and(|v| v >= goal_value)
}

/// Whether a recording counts as a satisfied day for this habit.
/// A missing record never satisfies.
pub fn is_satisfied(habit: &Habit, record: Option<&CompletionRecord>) -> bool {
    match record {
        None => false,
        Some(record) => match habit.goal_type {
            GoalType::Counter => meets_counter_goal(record, habit.goal_value),
            GoalType::Streak => record.completed,
        },
    }
}

/// One satisfied/unsatisfied boolean per recorded date, ordered by date.
/// Later records for the same date replace earlier ones; rows belonging
/// to other habits are ignored.
pub fn daily_status_map(habit: &Habit, records: &[CompletionRecord]) -> BTreeMap<NaiveDate, bool> {
    let mut status = BTreeMap::new();
    for record in records {
        if record.habit_id == habit.id {
            status.insert(record.date, is_satisfied(habit, Some(record)));
        }
    }
    status
}

/// Streak ending at the most recent recorded date.
///
/// Walks recorded dates newest to oldest, counting consecutive satisfied
/// days. Stops at the first unsatisfied day, or when the gap between two
/// recordings exceeds the policy tolerance.
pub fn current_streak(status: &BTreeMap<NaiveDate, bool>, policy: RepetitionPolicy) -> u32 {
    let tolerance = policy.max_recording_gap_days();
    let mut streak = 0;
    let mut newer: Option<NaiveDate> = None;

    for (&date, &satisfied) in status.iter().rev() {
        if let Some(newer) = newer {
            if calendar::gap_days(date, newer) > tolerance {
                break;
            }
        }
        if satisfied {
            streak += 1;
        } else {
            break;
        }
        newer = Some(date);
    }

    streak
}

/// Every streak run in the history, oldest first, including the current
/// in-progress run.
///
/// A run closes on an unsatisfied day or when the gap to the next
/// recording exceeds the policy tolerance.
pub fn all_streak_runs(status: &BTreeMap<NaiveDate, bool>, policy: RepetitionPolicy) -> Vec<u32> {
    let tolerance = policy.max_recording_gap_days();
    let entries: Vec<(NaiveDate, bool)> = status.iter().map(|(d, s)| (*d, *s)).collect();

    let mut runs = Vec::new();
    let mut run = 0;

    for (i, &(date, satisfied)) in entries.iter().enumerate() {
        if satisfied {
            run += 1;
        } else if run > 0 {
            runs.push(run);
            run = 0;
        }

        if let Some(&(next, _)) = entries.get(i + 1) {
            if calendar::gap_days(date, next) > tolerance && run > 0 {
                runs.push(run);
                run = 0;
            }
        }
    }

    if run > 0 {
        runs.push(run);
    }

    runs
}

/// Current streak for counter goals: consecutive days ending at the most
/// recent recording whose value met the goal, broken by any gap larger
/// than one day.
pub fn counter_streak(records: &[CompletionRecord], goal_value: f64) -> u32 {
    let mut sorted: Vec<&CompletionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut streak = 0;
    let mut newer: Option<NaiveDate> = None;

    for record in sorted {
        if let Some(newer) = newer {
            if calendar::gap_days(record.date, newer) > 1 {
                break;
            }
        }
        if meets_counter_goal(record, goal_value) {
            streak += 1;
        } else {
            break;
        }
        newer = Some(record.date);
    }

    streak
}

/// Recompute a habit's derived streak fields from its full history.
///
/// Runs after every completion write or delete; the result replaces all
/// three derived fields at once. `best_streak` never drops below the
/// habit's existing value.
pub fn recompute(habit: &Habit, records: &[CompletionRecord], today: NaiveDate) -> StreakSummary {
    match habit.goal_type {
        GoalType::Counter => {
            let current = counter_streak(records, habit.goal_value);
            let counter = records
                .iter()
                .find(|r| r.date == today)
                .and_then(|r| r.value)
                .unwrap_or(0.0);
            StreakSummary {
                current_streak: current,
                best_streak: habit.best_streak.max(current),
                current_counter: counter,
            }
        }
        GoalType::Streak => {
            let status = daily_status_map(habit, records);
            let current = current_streak(&status, habit.repetition);
            let longest = all_streak_runs(&status, habit.repetition)
                .into_iter()
                .max()
                .unwrap_or(0);
            StreakSummary {
                current_streak: current,
                best_streak: habit.best_streak.max(longest),
                current_counter: 0.0,
            }
        }
    }
}
