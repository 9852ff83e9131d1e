//! Cross-habit overview: headline counts, consistency ranking, streak
//! leader, and pooled weekday performance over a trailing window.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::habit::{CompletionRecord, Habit};
use crate::streak;

use super::{pooled_day_of_week_stats, success_rate, DayOfWeekStat};

/// One habit's standing in the consistency ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitConsistency {
    pub habit_id: String,
    pub habit_name: String,
    /// Success rate over the overview window
    pub success_rate: f64,
    pub current_streak: u32,
    pub best_streak: u32,
}

/// The habit holding the longest streak on record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakLeader {
    pub habit_name: String,
    pub best_streak: u32,
}

/// Headline analytics across all unarchived habits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewReport {
    /// Number of habits counted, archived ones excluded
    pub total_habits: u32,
    /// Same population as `total_habits`; kept as its own field so the
    /// two counts can diverge again if archived habits are ever included
    pub active_habits_count: u32,
    /// Habits with a satisfied record on the reference date
    pub completed_today: u32,
    /// Top habits by window success rate, zero-rate habits omitted
    pub most_consistent_habits: Vec<HabitConsistency>,
    /// Habit with the highest best streak, if any habits exist
    pub longest_streak_habit: Option<StreakLeader>,
    /// Length of the trailing window in days
    pub window_days: u64,
    /// Pooled satisfied-records over pooled active-days for the window
    pub window_success_rate: f64,
    /// Weekday with the best pooled success rate, if anything satisfied
    pub best_day_of_week: Option<DayOfWeekStat>,
    /// Pooled weekday breakdown, seven entries
    pub day_of_week_stats: Vec<DayOfWeekStat>,
}

/// Builds [`OverviewReport`]s for a reference date.
#[derive(Debug, Clone)]
pub struct OverviewAnalyzer {
    /// Date treated as "today"
    pub today: NaiveDate,
    /// Trailing window length in days
    pub window_days: u64,
    /// Maximum entries in the consistency ranking
    pub top_habits: usize,
}

impl OverviewAnalyzer {
    /// Analyzer with the standard 30-day window and top-5 ranking.
    pub fn new(today: NaiveDate) -> Self {
        OverviewAnalyzer {
            today,
            window_days: 30,
            top_habits: 5,
        }
    }

    pub fn with_window_days(mut self, window_days: u64) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn analyze(&self, habits: &[Habit], completions: &[CompletionRecord]) -> OverviewReport {
        let active: Vec<&Habit> = habits.iter().filter(|h| !h.archived).collect();
        let by_id: HashMap<&str, &Habit> = active.iter().map(|h| (h.id.as_str(), *h)).collect();

        let start = self
            .today
            .checked_sub_days(Days::new(self.window_days))
            .unwrap_or(self.today);
        let end = self.today;

        let completed_today = completions
            .iter()
            .filter(|r| r.date == self.today)
            .filter(|r| {
                by_id
                    .get(r.habit_id.as_str())
                    .is_some_and(|h| streak::is_satisfied(h, Some(r)))
            })
            .count() as u32;

        let mut ranking: Vec<HabitConsistency> = active
            .iter()
            .map(|habit| HabitConsistency {
                habit_id: habit.id.clone(),
                habit_name: habit.name.clone(),
                success_rate: success_rate(habit, completions, start, end),
                current_streak: habit.current_streak,
                best_streak: habit.best_streak,
            })
            .filter(|entry| entry.success_rate > 0.0)
            .collect();
        ranking.sort_by(|a, b| {
            b.success_rate
                .partial_cmp(&a.success_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranking.truncate(self.top_habits);

        let longest_streak_habit = active
            .iter()
            .fold(None::<&&Habit>, |leader, habit| match leader {
                Some(current) if current.best_streak >= habit.best_streak => leader,
                _ => Some(habit),
            })
            .map(|habit| StreakLeader {
                habit_name: habit.name.clone(),
                best_streak: habit.best_streak,
            });

        // Pooled rate: satisfied records in the window over the sum of
        // every habit's active days in it.
        let active_day_total: usize = active
            .iter()
            .map(|habit| habit.active_dates(start, end).len())
            .sum();
        let satisfied_in_window = completions
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .filter(|r| {
                by_id
                    .get(r.habit_id.as_str())
                    .is_some_and(|h| streak::is_satisfied(h, Some(r)))
            })
            .count();
        let window_success_rate = if active_day_total > 0 {
            satisfied_in_window as f64 / active_day_total as f64
        } else {
            0.0
        };

        let day_of_week_stats =
            pooled_day_of_week_stats(active.iter().copied(), completions, start, end);
        let best_day_of_week = day_of_week_stats
            .iter()
            .filter(|day| day.total_completions > 0)
            .fold(None::<&DayOfWeekStat>, |best, day| match best {
                Some(current) if current.success_rate >= day.success_rate => best,
                _ => Some(day),
            })
            .cloned();

        OverviewReport {
            total_habits: active.len() as u32,
            active_habits_count: active.len() as u32,
            completed_today,
            most_consistent_habits: ranking,
            longest_streak_habit,
            window_days: self.window_days,
            window_success_rate,
            best_day_of_week,
            day_of_week_stats,
        }
    }
}
