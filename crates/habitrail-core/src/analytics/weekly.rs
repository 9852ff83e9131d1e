//! Weekly report: a seven-day window starting at a chosen date, broken
//! down per day and per habit.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::habit::{CompletionRecord, Habit};
use crate::streak;

/// Completion outcome for one date of the week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyDayStat {
    pub date: NaiveDate,
    pub day_of_week: u32,
    pub day_name: String,
    /// Habits due on this date
    pub total_habits: u32,
    /// Due habits with a satisfied record
    pub completed_habits: u32,
    pub completion_rate: f64,
}

/// One habit's week at a glance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyHabitStat {
    pub habit_id: String,
    pub habit_name: String,
    /// Active days the habit had within the week
    pub active_days_count: u32,
    /// Dates with a satisfied record within the week
    pub completed_days_count: u32,
    /// Satisfied days over active days, 0 without active days
    pub success_rate: f64,
    /// The satisfied dates, ascending
    pub completed_dates: Vec<NaiveDate>,
}

/// Week-level rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummary {
    /// Mean of the seven daily completion rates
    pub overall_success_rate: f64,
    /// Satisfied records across the week
    pub total_completions: u32,
    pub most_productive_day: Option<WeeklyDayStat>,
    pub least_productive_day: Option<WeeklyDayStat>,
    /// Best habit by success rate among those with active days
    pub most_productive_habit: Option<WeeklyHabitStat>,
}

/// Seven days of habit activity starting at `start_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// One entry per date, in calendar order
    pub daily_stats: Vec<WeeklyDayStat>,
    pub weekly_stats: WeeklySummary,
    /// Per-habit stats, sorted by success rate descending
    pub habit_stats: Vec<WeeklyHabitStat>,
}

/// Build the weekly report for the seven days starting at `week_start`.
pub fn weekly_report(
    habits: &[Habit],
    completions: &[CompletionRecord],
    week_start: NaiveDate,
) -> WeeklyReport {
    let week_end = week_start
        .checked_add_days(Days::new(6))
        .unwrap_or(week_start);
    let dates = calendar::days_between(week_start, week_end);
    let active: Vec<&Habit> = habits.iter().filter(|h| !h.archived).collect();

    let daily_stats: Vec<WeeklyDayStat> = dates
        .iter()
        .map(|&date| {
            let due: Vec<&&Habit> = active.iter().filter(|h| h.is_due_on(date)).collect();
            let completed = due
                .iter()
                .filter(|habit| {
                    let record = completions
                        .iter()
                        .find(|r| r.habit_id == habit.id && r.date == date);
                    streak::is_satisfied(habit, record)
                })
                .count() as u32;
            let total = due.len() as u32;

            WeeklyDayStat {
                date,
                day_of_week: calendar::day_of_week(date),
                day_name: calendar::day_name(calendar::day_of_week(date)).to_string(),
                total_habits: total,
                completed_habits: completed,
                completion_rate: if total > 0 {
                    completed as f64 / total as f64
                } else {
                    0.0
                },
            }
        })
        .collect();

    let mut habit_stats: Vec<WeeklyHabitStat> = active
        .iter()
        .map(|habit| {
            let active_days = habit.active_dates(week_start, week_end).len() as u32;
            let mut completed_dates: Vec<NaiveDate> = completions
                .iter()
                .filter(|r| {
                    r.habit_id == habit.id && r.date >= week_start && r.date <= week_end
                })
                .filter(|r| streak::is_satisfied(habit, Some(r)))
                .map(|r| r.date)
                .collect();
            completed_dates.sort_unstable();

            WeeklyHabitStat {
                habit_id: habit.id.clone(),
                habit_name: habit.name.clone(),
                active_days_count: active_days,
                completed_days_count: completed_dates.len() as u32,
                success_rate: if active_days > 0 {
                    completed_dates.len() as f64 / active_days as f64
                } else {
                    0.0
                },
                completed_dates,
            }
        })
        .collect();

    let overall_success_rate = if dates.is_empty() {
        0.0
    } else {
        daily_stats.iter().map(|d| d.completion_rate).sum::<f64>() / dates.len() as f64
    };

    let total_completions: u32 = habit_stats.iter().map(|h| h.completed_days_count).sum();

    let most_productive_day = daily_stats
        .iter()
        .fold(None::<&WeeklyDayStat>, |best, day| match best {
            Some(current) if current.completion_rate >= day.completion_rate => best,
            _ => Some(day),
        })
        .cloned();
    let least_productive_day = daily_stats
        .iter()
        .fold(None::<&WeeklyDayStat>, |worst, day| match worst {
            Some(current) if current.completion_rate <= day.completion_rate => worst,
            _ => Some(day),
        })
        .cloned();
    let most_productive_habit = habit_stats
        .iter()
        .filter(|h| h.active_days_count > 0)
        .fold(None::<&WeeklyHabitStat>, |best, habit| match best {
            Some(current) if current.success_rate >= habit.success_rate => best,
            _ => Some(habit),
        })
        .cloned();

    habit_stats.sort_by(|a, b| {
        b.success_rate
            .partial_cmp(&a.success_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    WeeklyReport {
        start_date: week_start,
        end_date: week_end,
        daily_stats,
        weekly_stats: WeeklySummary {
            overall_success_rate,
            total_completions,
            most_productive_day,
            least_productive_day,
            most_productive_habit,
        },
        habit_stats,
    }
}
