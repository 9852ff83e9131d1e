//! Monthly report: full-calendar-month breakdown with per-day,
//! per-weekday and per-habit views.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::last_day_of_month;
use crate::calendar;
use crate::error::ValidationError;
use crate::habit::{CompletionRecord, Habit};
use crate::streak;

/// Completion outcome for one date of the month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyDayStat {
    pub date: NaiveDate,
    pub day_of_week: u32,
    pub day_name: String,
    /// Habits with a satisfied record on this date
    pub count: u32,
    /// Habits due on this date
    pub total_habits: u32,
    /// Satisfied over due, capped at 1.0
    pub completion_rate: f64,
}

/// Weekday aggregate across the whole month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthDayOfWeekStat {
    pub day_of_week: u32,
    pub day_name: String,
    pub success_rate: f64,
    pub total_habits: u32,
    pub completed_habits: u32,
}

/// One habit's month at a glance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyHabitStat {
    pub habit_id: String,
    pub habit_name: String,
    pub tag: String,
    pub active_days_count: u32,
    /// Distinct dates with a satisfied record within the month
    pub completed_days_count: u32,
    pub completion_rate: f64,
    pub current_streak: u32,
    pub best_streak: u32,
}

/// Month-level rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Habits that were not archived
    pub total_habits: u32,
    /// Sum of the per-day satisfied counts
    pub total_completions: u32,
    pub overall_completion_rate: f64,
    /// Name of the best habit by completion rate, among those with active days
    pub most_productive_habit: Option<String>,
    /// Name of the habit holding the longest best streak
    pub best_streak_habit: Option<String>,
    /// Best and worst dates among those with at least one due habit
    pub best_day: Option<MonthlyDayStat>,
    pub worst_day: Option<MonthlyDayStat>,
}

/// Calendar-month view of habit activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// One entry per date of the month, in calendar order
    pub daily_stats: Vec<MonthlyDayStat>,
    /// Seven entries, Sunday first
    pub day_of_week_stats: Vec<MonthDayOfWeekStat>,
    /// Per-habit stats, sorted by completion rate descending
    pub habit_stats: Vec<MonthlyHabitStat>,
    pub summary: MonthlySummary,
}

/// Build the report for one calendar month. Fails when the month is out
/// of range or the year does not form a valid date.
pub fn monthly_report(
    habits: &[Habit],
    completions: &[CompletionRecord],
    year: i32,
    month: u32,
) -> Result<MonthlyReport, ValidationError> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidMonth { month });
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(ValidationError::InvalidDate {
        value: format!("{year}-{month:02}-01"),
    })?;
    let end = last_day_of_month(year, month).ok_or(ValidationError::InvalidDate {
        value: format!("{year}-{month:02}"),
    })?;

    let dates = calendar::days_between(start, end);
    let active: Vec<&Habit> = habits.iter().filter(|h| !h.archived).collect();

    let daily_stats: Vec<MonthlyDayStat> = dates
        .iter()
        .map(|&date| {
            let count = active
                .iter()
                .filter(|habit| {
                    let record = completions
                        .iter()
                        .find(|r| r.habit_id == habit.id && r.date == date);
                    streak::is_satisfied(habit, record)
                })
                .count() as u32;
            let total = active.iter().filter(|h| h.is_due_on(date)).count() as u32;

            MonthlyDayStat {
                date,
                day_of_week: calendar::day_of_week(date),
                day_name: calendar::day_name(calendar::day_of_week(date)).to_string(),
                count,
                total_habits: total,
                completion_rate: if total > 0 {
                    (count as f64 / total as f64).min(1.0)
                } else {
                    0.0
                },
            }
        })
        .collect();

    let day_of_week_stats: Vec<MonthDayOfWeekStat> = (0..7)
        .map(|weekday| {
            let mut total = 0u32;
            let mut completed = 0u32;
            for day in daily_stats.iter().filter(|d| d.day_of_week == weekday) {
                total += day.total_habits;
                completed += day.count;
            }

            MonthDayOfWeekStat {
                day_of_week: weekday,
                day_name: calendar::day_name(weekday).to_string(),
                success_rate: if total > 0 {
                    (completed as f64 / total as f64).min(1.0)
                } else {
                    0.0
                },
                total_habits: total,
                completed_habits: completed,
            }
        })
        .collect();

    let mut habit_stats: Vec<MonthlyHabitStat> = active
        .iter()
        .map(|habit| {
            let active_days = habit.active_dates(start, end).len() as u32;
            let completed_days = completions
                .iter()
                .filter(|r| r.habit_id == habit.id && r.date >= start && r.date <= end)
                .filter(|r| streak::is_satisfied(habit, Some(r)))
                .map(|r| r.date)
                .collect::<BTreeSet<_>>()
                .len() as u32;

            MonthlyHabitStat {
                habit_id: habit.id.clone(),
                habit_name: habit.name.clone(),
                tag: habit.tag.clone(),
                active_days_count: active_days,
                completed_days_count: completed_days,
                completion_rate: if active_days > 0 {
                    (completed_days as f64 / active_days as f64).min(1.0)
                } else {
                    0.0
                },
                current_streak: habit.current_streak,
                best_streak: habit.best_streak,
            }
        })
        .collect();

    let total_completions: u32 = daily_stats.iter().map(|d| d.count).sum();
    let total_due: u32 = daily_stats.iter().map(|d| d.total_habits).sum();
    let overall_completion_rate = if total_due > 0 {
        (total_completions as f64 / total_due as f64).min(1.0)
    } else {
        0.0
    };

    let most_productive_habit = habit_stats
        .iter()
        .filter(|h| h.active_days_count > 0)
        .fold(None::<&MonthlyHabitStat>, |best, habit| match best {
            Some(current) if current.completion_rate >= habit.completion_rate => best,
            _ => Some(habit),
        })
        .map(|h| h.habit_name.clone());
    let best_streak_habit = habit_stats
        .iter()
        .fold(None::<&MonthlyHabitStat>, |best, habit| match best {
            Some(current) if current.best_streak >= habit.best_streak => best,
            _ => Some(habit),
        })
        .map(|h| h.habit_name.clone());

    let best_day = daily_stats
        .iter()
        .filter(|d| d.total_habits > 0)
        .fold(None::<&MonthlyDayStat>, |best, day| match best {
            Some(current) if current.completion_rate >= day.completion_rate => best,
            _ => Some(day),
        })
        .cloned();
    let worst_day = daily_stats
        .iter()
        .filter(|d| d.total_habits > 0)
        .fold(None::<&MonthlyDayStat>, |worst, day| match worst {
            Some(current) if current.completion_rate <= day.completion_rate => worst,
            _ => Some(day),
        })
        .cloned();

    habit_stats.sort_by(|a, b| {
        b.completion_rate
            .partial_cmp(&a.completion_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(MonthlyReport {
        year,
        month,
        month_name: calendar::month_name(month).to_string(),
        start_date: start,
        end_date: end,
        daily_stats,
        day_of_week_stats,
        habit_stats,
        summary: MonthlySummary {
            total_habits: active.len() as u32,
            total_completions,
            overall_completion_rate,
            most_productive_habit,
            best_streak_habit,
            best_day,
            worst_day,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        calendar::parse_date(value).unwrap()
    }

    fn habit(name: &str, created: &str) -> Habit {
        let mut habit = Habit::new(name, "general");
        habit.created_at = date(created).and_hms_opt(8, 0, 0).unwrap().and_utc();
        habit
    }

    fn rec(habit: &Habit, day: &str, completed: bool) -> CompletionRecord {
        CompletionRecord::new(habit.id.clone(), date(day), completed)
    }

    #[test]
    fn test_rejects_invalid_month() {
        let err = monthly_report(&[], &[], 2025, 13).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMonth { month: 13 }));
        let err = monthly_report(&[], &[], 2025, 0).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMonth { month: 0 }));
    }

    #[test]
    fn test_window_covers_whole_month() {
        let report = monthly_report(&[], &[], 2024, 2).unwrap();
        assert_eq!(report.start_date, date("2024-02-01"));
        assert_eq!(report.end_date, date("2024-02-29"));
        assert_eq!(report.daily_stats.len(), 29);
        assert_eq!(report.month_name, "February");
        assert_eq!(report.day_of_week_stats.len(), 7);
    }

    #[test]
    fn test_daily_counts_and_rate_cap() {
        let due = habit("Due", "2025-02-01");
        // Created on 03-10, so not due that day, but its record still counts.
        let fresh = habit("Fresh", "2025-03-10");
        let records = vec![rec(&due, "2025-03-10", true), rec(&fresh, "2025-03-10", true)];

        let report = monthly_report(&[due, fresh], &records, 2025, 3).unwrap();
        let day = &report.daily_stats[9];
        assert_eq!(day.date, date("2025-03-10"));
        assert_eq!(day.count, 2);
        assert_eq!(day.total_habits, 1);
        assert_eq!(day.completion_rate, 1.0);
    }

    #[test]
    fn test_day_of_week_aggregation() {
        let h = habit("Routine", "2025-02-01");
        // March 2025 has five Saturdays; complete two of them.
        let records = vec![rec(&h, "2025-03-01", true), rec(&h, "2025-03-08", true)];

        let report = monthly_report(&[h], &records, 2025, 3).unwrap();
        let saturday = &report.day_of_week_stats[6];
        assert_eq!(saturday.day_name, "Saturday");
        assert_eq!(saturday.total_habits, 5);
        assert_eq!(saturday.completed_habits, 2);
        assert!((saturday.success_rate - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_habit_stats_and_summary() {
        let mut steady = habit("Steady", "2025-02-01");
        steady.current_streak = 4;
        steady.best_streak = 12;
        let patchy = habit("Patchy", "2025-02-01");
        let mut records: Vec<CompletionRecord> = (1..=31)
            .map(|day| rec(&steady, &format!("2025-03-{day:02}"), true))
            .collect();
        records.push(rec(&patchy, "2025-03-05", true));

        let report = monthly_report(&[steady, patchy], &records, 2025, 3).unwrap();
        assert_eq!(report.habit_stats[0].habit_name, "Steady");
        assert_eq!(report.habit_stats[0].active_days_count, 31);
        assert_eq!(report.habit_stats[0].completed_days_count, 31);
        assert_eq!(report.habit_stats[0].completion_rate, 1.0);
        assert_eq!(report.habit_stats[1].habit_name, "Patchy");

        assert_eq!(report.summary.total_habits, 2);
        assert_eq!(report.summary.total_completions, 32);
        assert_eq!(report.summary.most_productive_habit.as_deref(), Some("Steady"));
        assert_eq!(report.summary.best_streak_habit.as_deref(), Some("Steady"));
    }

    #[test]
    fn test_best_day_requires_a_due_habit() {
        // Nothing is ever due, so no best or worst day exists.
        let report = monthly_report(&[], &[], 2025, 3).unwrap();
        assert!(report.summary.best_day.is_none());
        assert!(report.summary.worst_day.is_none());

        let h = habit("Walk", "2025-02-01");
        let records = vec![rec(&h, "2025-03-07", true)];
        let report = monthly_report(&[h], &records, 2025, 3).unwrap();
        let best = report.summary.best_day.unwrap();
        assert_eq!(best.date, date("2025-03-07"));
        // Worst ties at zero resolve to the first due date of the month.
        let worst = report.summary.worst_day.unwrap();
        assert_eq!(worst.date, date("2025-03-01"));
    }
}
