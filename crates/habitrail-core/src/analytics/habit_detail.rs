//! Single-habit report: window stats, weekday breakdown, top streaks,
//! and the year's monthly trend line.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::habit::{CompletionRecord, GoalType, Habit};
use crate::streak;

use super::{
    best_worst_day, day_of_week_stats, monthly_trends, success_rate, DayOfWeekStat, DayRef,
    MonthlyTrend, Period, PeriodWindow,
};

/// Completion counts for the evaluation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicStats {
    /// Active days in the window
    pub total_days: u32,
    /// Active days with a satisfied record
    pub completed_days: u32,
    /// `completed_days / total_days`, 0 when there are no active days
    pub success_rate: f64,
    pub current_streak: u32,
    pub best_streak: u32,
}

/// One logged value for a counter habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterEntry {
    pub date: NaiveDate,
    pub value: f64,
}

/// Counter-goal progress over the window. Absent for streak goals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterStats {
    /// Sum of every logged value in the window
    pub total_value: f64,
    pub goal_value: f64,
    /// `total_value / goal_value`, 0 when the goal value is not positive
    pub progress: f64,
    /// Window records oldest first
    pub completions: Vec<CounterEntry>,
}

/// Everything the habit view renders for one habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitDetailReport {
    pub habit_id: String,
    pub habit_name: String,
    pub window: PeriodWindow,
    pub basic_stats: BasicStats,
    pub counter_stats: Option<CounterStats>,
    pub day_of_week_stats: Vec<DayOfWeekStat>,
    pub best_day: Option<DayRef>,
    pub worst_day: Option<DayRef>,
    /// Longest streak runs from the full history, longest first
    pub top_streaks: Vec<u32>,
    /// Per-month success rates for the reference year
    pub monthly_trends: Vec<MonthlyTrend>,
}

/// Builds [`HabitDetailReport`]s for a reference date.
#[derive(Debug, Clone)]
pub struct HabitDetailAnalyzer {
    /// Date treated as "today"; also selects the trend year
    pub today: NaiveDate,
    /// Number of streak runs to keep in the report
    pub top_streaks: usize,
}

impl HabitDetailAnalyzer {
    pub fn new(today: NaiveDate) -> Self {
        HabitDetailAnalyzer {
            today,
            top_streaks: 3,
        }
    }

    /// Build the report. The window stats use `period` ending today;
    /// `top_streaks` and `monthly_trends` read the full history.
    pub fn analyze(
        &self,
        habit: &Habit,
        records: &[CompletionRecord],
        period: Period,
    ) -> HabitDetailReport {
        let (start, end) = period.window_ending(self.today);
        let status = streak::daily_status_map(habit, records);

        let active = habit.active_dates(start, end);
        let completed_days = active
            .iter()
            .filter(|date| status.get(*date).copied().unwrap_or(false))
            .count() as u32;

        let basic_stats = BasicStats {
            total_days: active.len() as u32,
            completed_days,
            success_rate: success_rate(habit, records, start, end),
            current_streak: habit.current_streak,
            best_streak: habit.best_streak,
        };

        let counter_stats = match habit.goal_type {
            GoalType::Streak => None,
            GoalType::Counter => {
                let mut completions: Vec<CounterEntry> = records
                    .iter()
                    .filter(|r| r.habit_id == habit.id && r.date >= start && r.date <= end)
                    .map(|r| CounterEntry {
                        date: r.date,
                        value: r.value.unwrap_or(0.0),
                    })
                    .collect();
                completions.sort_by_key(|entry| entry.date);

                let total_value: f64 = completions.iter().map(|entry| entry.value).sum();
                Some(CounterStats {
                    total_value,
                    goal_value: habit.goal_value,
                    progress: if habit.goal_value > 0.0 {
                        total_value / habit.goal_value
                    } else {
                        0.0
                    },
                    completions,
                })
            }
        };

        let (best, worst) = best_worst_day(habit, records, start, end);

        let mut top_streaks = streak::all_streak_runs(&status, habit.repetition);
        top_streaks.sort_unstable_by(|a, b| b.cmp(a));
        top_streaks.truncate(self.top_streaks);

        HabitDetailReport {
            habit_id: habit.id.clone(),
            habit_name: habit.name.clone(),
            window: PeriodWindow {
                start_date: start,
                end_date: end,
                period,
            },
            basic_stats,
            counter_stats,
            day_of_week_stats: day_of_week_stats(habit, records, start, end),
            best_day: DayRef::from_index(best),
            worst_day: DayRef::from_index(worst),
            top_streaks,
            monthly_trends: monthly_trends(habit, records, self.today.year()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar;

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

    fn rec_value(habit: &Habit, day: &str, value: f64) -> CompletionRecord {
        CompletionRecord::new(habit.id.clone(), date(day), true).with_value(value)
    }

    #[test]
    fn test_basic_stats_over_window() {
        let mut h = habit("Read", "2025-01-01");
        h.current_streak = 2;
        h.best_streak = 5;
        let records = vec![
            rec(&h, "2025-03-08", true),
            rec(&h, "2025-03-09", false),
            rec(&h, "2025-03-10", true),
        ];

        let report = HabitDetailAnalyzer::new(date("2025-03-10")).analyze(
            &h,
            &records,
            Period::Days7,
        );

        // Window 03-03 through 03-10, all active for a daily habit.
        assert_eq!(report.window.start_date, date("2025-03-03"));
        assert_eq!(report.window.end_date, date("2025-03-10"));
        assert_eq!(report.window.period, Period::Days7);
        assert_eq!(report.basic_stats.total_days, 8);
        assert_eq!(report.basic_stats.completed_days, 2);
        assert_eq!(report.basic_stats.success_rate, 0.25);
        assert_eq!(report.basic_stats.current_streak, 2);
        assert_eq!(report.basic_stats.best_streak, 5);
        assert!(report.counter_stats.is_none());
    }

    #[test]
    fn test_counter_stats_sum_and_progress() {
        let h = habit("Water", "2025-01-01").with_counter_goal(8.0);
        let records = vec![
            rec_value(&h, "2025-03-10", 6.0),
            rec_value(&h, "2025-03-08", 8.0),
            // One record without a value counts as zero.
            rec(&h, "2025-03-09", true),
        ];

        let report = HabitDetailAnalyzer::new(date("2025-03-10")).analyze(
            &h,
            &records,
            Period::Days7,
        );

        let counter = report.counter_stats.unwrap();
        assert_eq!(counter.total_value, 14.0);
        assert_eq!(counter.goal_value, 8.0);
        assert!((counter.progress - 14.0 / 8.0).abs() < 1e-9);
        let dates: Vec<NaiveDate> = counter.completions.iter().map(|c| c.date).collect();
        assert_eq!(
            dates,
            vec![date("2025-03-08"), date("2025-03-09"), date("2025-03-10")]
        );
    }

    #[test]
    fn test_counter_progress_guard_for_zero_goal() {
        let h = habit("Water", "2025-01-01").with_counter_goal(0.0);
        let records = vec![rec_value(&h, "2025-03-10", 6.0)];
        let report = HabitDetailAnalyzer::new(date("2025-03-10")).analyze(
            &h,
            &records,
            Period::Days7,
        );
        assert_eq!(report.counter_stats.unwrap().progress, 0.0);
    }

    #[test]
    fn test_top_streaks_come_from_full_history() {
        let h = habit("Read", "2024-01-01");
        let mut records = Vec::new();
        // A 4-run in 2024, well outside any window.
        for day in 10..=13 {
            records.push(rec(&h, &format!("2024-06-{day:02}"), true));
        }
        // A 2-run and a 1-run near the reference date.
        records.push(rec(&h, "2025-03-05", true));
        records.push(rec(&h, "2025-03-06", true));
        records.push(rec(&h, "2025-03-10", true));

        let report = HabitDetailAnalyzer::new(date("2025-03-10")).analyze(
            &h,
            &records,
            Period::Days7,
        );
        assert_eq!(report.top_streaks, vec![4, 2, 1]);
    }

    #[test]
    fn test_top_streaks_truncated_to_three() {
        let h = habit("Read", "2024-01-01");
        let mut records = Vec::new();
        for month in 1..=5u32 {
            // Five isolated one-day runs.
            records.push(rec(&h, &format!("2025-{month:02}-01"), true));
        }
        let report = HabitDetailAnalyzer::new(date("2025-06-01")).analyze(
            &h,
            &records,
            Period::Days30,
        );
        assert_eq!(report.top_streaks.len(), 3);
    }

    #[test]
    fn test_best_worst_day_mapping() {
        let h = habit("Read", "2025-01-01");
        let records = vec![
            // Sunday satisfied, Monday missed.
            rec(&h, "2025-03-02", true),
            rec(&h, "2025-03-03", false),
        ];
        let report = HabitDetailAnalyzer::new(date("2025-03-10")).analyze(
            &h,
            &records,
            Period::Days30,
        );
        assert_eq!(report.best_day.unwrap().day_name, "Sunday");
        assert_eq!(report.worst_day.unwrap().day_name, "Monday");

        let empty = HabitDetailAnalyzer::new(date("2025-03-10")).analyze(&h, &[], Period::Days30);
        assert!(empty.best_day.is_none());
        assert!(empty.worst_day.is_none());
    }

    #[test]
    fn test_monthly_trends_follow_reference_year() {
        let h = habit("Read", "2024-01-01");
        let records = vec![rec(&h, "2024-05-10", true), rec(&h, "2025-02-10", true)];
        let report = HabitDetailAnalyzer::new(date("2025-03-10")).analyze(
            &h,
            &records,
            Period::Days30,
        );
        assert_eq!(report.monthly_trends.len(), 12);
        // Only the 2025 record lands in the trend line.
        assert_eq!(report.monthly_trends[1].completions, 1);
        assert_eq!(report.monthly_trends[4].completions, 0);
    }
}
