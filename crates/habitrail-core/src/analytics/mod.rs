//! Aggregation engine: composes the calendar, classifier, and streak
//! primitives into the overview, per-habit, daily, weekly, monthly, and
//! all-habits reports.
//!
//! Every builder here is a pure function of already-loaded collections;
//! no I/O happens inside this module tree. Rates are plain ratios in
//! [0, 1] with zero denominators resolving to 0. Rankings use stable
//! ordering so ties fall back to input order.

pub mod daily;
pub mod habit_detail;
pub mod monthly;
pub mod overview;
pub mod summary;
pub mod weekly;

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::habit::{CompletionRecord, Habit};
use crate::streak;

pub use daily::{daily_report, DailyHabitDetail, DailyReport, TagStat};
pub use habit_detail::{
    BasicStats, CounterEntry, CounterStats, HabitDetailAnalyzer, HabitDetailReport,
};
pub use monthly::{monthly_report, MonthlyReport};
pub use overview::{HabitConsistency, OverviewAnalyzer, OverviewReport, StreakLeader};
pub use summary::{habits_summary, HabitSummary};
pub use weekly::{weekly_report, WeeklyHabitStat, WeeklyReport};

/// Evaluation window length for habit reports, counted back from the
/// reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "7days")]
    Days7,
    #[serde(rename = "30days")]
    Days30,
    #[serde(rename = "90days")]
    Days90,
    #[serde(rename = "365days")]
    Days365,
}

impl Default for Period {
    fn default() -> Self {
        Period::Days30
    }
}

impl Period {
    /// Parse a period label; anything unrecognized falls back to 30 days.
    pub fn parse(value: &str) -> Period {
        match value {
            "7days" => Period::Days7,
            "30days" => Period::Days30,
            "90days" => Period::Days90,
            "365days" => Period::Days365,
            _ => Period::Days30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Days7 => "7days",
            Period::Days30 => "30days",
            Period::Days90 => "90days",
            Period::Days365 => "365days",
        }
    }

    pub fn days(&self) -> u64 {
        match self {
            Period::Days7 => 7,
            Period::Days30 => 30,
            Period::Days90 => 90,
            Period::Days365 => 365,
        }
    }

    /// Inclusive window `[end - days, end]`.
    pub fn window_ending(&self, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = end.checked_sub_days(Days::new(self.days())).unwrap_or(end);
        (start, end)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The evaluation window a report was computed over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period: Period,
}

/// Success ratio for one weekday over a window.
///
/// The population is *recorded* completions, not the active-day
/// calendar: `success_rate` is satisfied over recorded for that weekday,
/// and `total_completions` counts the satisfied ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayOfWeekStat {
    /// Weekday index, 0 = Sunday
    pub day_of_week: u32,
    /// English weekday name
    pub day_name: String,
    /// Satisfied over recorded completions for this weekday, 0 if none
    pub success_rate: f64,
    /// Number of satisfied completions on this weekday
    pub total_completions: u32,
}

/// A weekday reference used for best/worst day reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRef {
    pub day_of_week: u32,
    pub day_name: String,
}

impl DayRef {
    /// Lift a `-1`-style sentinel into an optional weekday reference.
    pub fn from_index(index: i32) -> Option<DayRef> {
        if (0..7).contains(&index) {
            Some(DayRef {
                day_of_week: index as u32,
                day_name: calendar::day_name(index as u32).to_string(),
            })
        } else {
            None
        }
    }
}

/// Success rate and satisfied-completion count for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// Month number, 1-12
    pub month: u32,
    /// English month name
    pub month_name: String,
    /// Success rate over the habit's active days in that month
    pub success_rate: f64,
    /// Satisfied completions recorded in that month
    pub completions: u32,
}

/// Index one habit's records by date for window lookups. Rows belonging
/// to other habits are ignored, so callers may pass a mixed collection.
fn by_date<'a>(
    habit: &Habit,
    records: &'a [CompletionRecord],
) -> HashMap<NaiveDate, &'a CompletionRecord> {
    let mut map = HashMap::new();
    for record in records {
        if record.habit_id == habit.id {
            map.insert(record.date, record);
        }
    }
    map
}

/// Satisfied active-days over total active-days for one habit in
/// `[start, end]`. Zero when the habit has no active days in the window.
pub fn success_rate(
    habit: &Habit,
    records: &[CompletionRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> f64 {
    let active = habit.active_dates(start, end);
    if active.is_empty() {
        return 0.0;
    }

    let records = by_date(habit, records);
    let satisfied = active
        .iter()
        .filter(|date| streak::is_satisfied(habit, records.get(date).copied()))
        .count();

    satisfied as f64 / active.len() as f64
}

/// Per-weekday counts accumulated while scanning records.
struct DayBuckets {
    recorded: [u32; 7],
    satisfied: [u32; 7],
}

impl DayBuckets {
    fn new() -> Self {
        DayBuckets {
            recorded: [0; 7],
            satisfied: [0; 7],
        }
    }

    fn record(&mut self, date: NaiveDate, satisfied: bool) {
        let day = calendar::day_of_week(date) as usize;
        self.recorded[day] += 1;
        if satisfied {
            self.satisfied[day] += 1;
        }
    }

    fn build(&self) -> Vec<DayOfWeekStat> {
        (0..7u32)
            .map(|day| {
                let recorded = self.recorded[day as usize];
                let satisfied = self.satisfied[day as usize];
                DayOfWeekStat {
                    day_of_week: day,
                    day_name: calendar::day_name(day).to_string(),
                    success_rate: if recorded > 0 {
                        satisfied as f64 / recorded as f64
                    } else {
                        0.0
                    },
                    total_completions: satisfied,
                }
            })
            .collect()
    }

    /// Best and worst weekday among those with at least one recorded
    /// completion; `-1` when nothing was recorded. Ties go to the
    /// earliest weekday.
    fn best_worst(&self) -> (i32, i32) {
        let mut best = -1;
        let mut worst = -1;
        let mut best_rate = f64::NEG_INFINITY;
        let mut worst_rate = f64::INFINITY;

        for day in 0..7 {
            if self.recorded[day] == 0 {
                continue;
            }
            let rate = self.satisfied[day] as f64 / self.recorded[day] as f64;
            if rate > best_rate {
                best_rate = rate;
                best = day as i32;
            }
            if rate < worst_rate {
                worst_rate = rate;
                worst = day as i32;
            }
        }

        (best, worst)
    }
}

fn bucket_records(
    habit: &Habit,
    records: &[CompletionRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> DayBuckets {
    let mut buckets = DayBuckets::new();
    for record in records {
        if record.habit_id == habit.id && record.date >= start && record.date <= end {
            buckets.record(record.date, streak::is_satisfied(habit, Some(record)));
        }
    }
    buckets
}

/// Weekday breakdown for one habit's recorded completions in a window.
/// Always returns seven entries, Sunday first.
pub fn day_of_week_stats(
    habit: &Habit,
    records: &[CompletionRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DayOfWeekStat> {
    bucket_records(habit, records, start, end).build()
}

/// Weekday breakdown pooled over many habits. Records without a matching
/// habit are skipped; satisfaction is judged per owning habit.
pub fn pooled_day_of_week_stats<'a, I>(
    habits: I,
    records: &[CompletionRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DayOfWeekStat>
where
    I: IntoIterator<Item = &'a Habit>,
{
    let by_id: HashMap<&str, &Habit> = habits.into_iter().map(|h| (h.id.as_str(), h)).collect();

    let mut buckets = DayBuckets::new();
    for record in records {
        if record.date < start || record.date > end {
            continue;
        }
        if let Some(habit) = by_id.get(record.habit_id.as_str()) {
            buckets.record(record.date, streak::is_satisfied(habit, Some(record)));
        }
    }
    buckets.build()
}

/// Best and worst weekday for one habit over a window, as indices with
/// `-1` meaning "no recorded completions at all".
pub fn best_worst_day(
    habit: &Habit,
    records: &[CompletionRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> (i32, i32) {
    bucket_records(habit, records, start, end).best_worst()
}

/// Month-by-month success rates for one habit across a calendar year.
pub fn monthly_trends(habit: &Habit, records: &[CompletionRecord], year: i32) -> Vec<MonthlyTrend> {
    let mut trends = Vec::with_capacity(12);

    for month in 1..=12u32 {
        let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            continue;
        };
        let Some(end) = last_day_of_month(year, month) else {
            continue;
        };

        let completions = records
            .iter()
            .filter(|r| r.habit_id == habit.id && r.date >= start && r.date <= end)
            .filter(|r| streak::is_satisfied(habit, Some(r)))
            .count() as u32;

        trends.push(MonthlyTrend {
            month,
            month_name: calendar::month_name(month).to_string(),
            success_rate: success_rate(habit, records, start, end),
            completions,
        });
    }

    trends
}

/// Last calendar day of a month, if the month exists.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next.and_then(|d| d.pred_opt())
}
