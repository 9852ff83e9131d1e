//! Daily report: the habits due on one calendar date, how each went,
//! and a per-tag rollup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::{CompletionRecord, GoalType, Habit};
use crate::streak;

/// One due habit's outcome on the report date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyHabitDetail {
    pub habit_id: String,
    pub habit_name: String,
    pub tag: String,
    pub goal_type: GoalType,
    pub goal_value: f64,
    /// Whether the day's record satisfied the goal
    pub satisfied: bool,
    /// Logged value, for counter goals
    pub value: Option<f64>,
}

/// Completion rollup for one tag on the report date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagStat {
    pub tag: String,
    /// Due habits carrying this tag
    pub total_habits: u32,
    /// How many of them were satisfied
    pub completed_habits: u32,
    pub completion_rate: f64,
}

/// Outcome of one calendar date across all due habits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    /// Satisfied due habits over due habits, 0 when nothing was due
    pub completion_rate: f64,
    /// Habits due on this date
    pub total_habits: u32,
    /// Due habits with a satisfied record
    pub completed_habits: u32,
    /// Per-habit outcomes, in habit input order
    pub habit_details: Vec<DailyHabitDetail>,
    /// Per-tag rollup, sorted by completion rate descending
    pub tag_stats: Vec<TagStat>,
}

/// Build the daily report for `date`. A habit is due when it is not
/// archived, was created strictly before `date`, and its schedule
/// includes `date`.
pub fn daily_report(
    habits: &[Habit],
    completions: &[CompletionRecord],
    date: NaiveDate,
) -> DailyReport {
    let due: Vec<&Habit> = habits.iter().filter(|h| h.is_due_on(date)).collect();

    let mut habit_details = Vec::with_capacity(due.len());
    let mut tags: Vec<TagStat> = Vec::new();
    let mut completed = 0u32;

    for habit in &due {
        let record = completions
            .iter()
            .find(|r| r.habit_id == habit.id && r.date == date);
        let satisfied = streak::is_satisfied(habit, record);
        if satisfied {
            completed += 1;
        }

        habit_details.push(DailyHabitDetail {
            habit_id: habit.id.clone(),
            habit_name: habit.name.clone(),
            tag: habit.tag.clone(),
            goal_type: habit.goal_type,
            goal_value: habit.goal_value,
            satisfied,
            value: record.and_then(|r| r.value),
        });

        // Tags accumulate in first-seen order so rate ties stay stable.
        let index = match tags.iter().position(|t| t.tag == habit.tag) {
            Some(index) => index,
            None => {
                tags.push(TagStat {
                    tag: habit.tag.clone(),
                    total_habits: 0,
                    completed_habits: 0,
                    completion_rate: 0.0,
                });
                tags.len() - 1
            }
        };
        tags[index].total_habits += 1;
        if satisfied {
            tags[index].completed_habits += 1;
        }
    }

    for tag in &mut tags {
        tag.completion_rate = if tag.total_habits > 0 {
            tag.completed_habits as f64 / tag.total_habits as f64
        } else {
            0.0
        };
    }
    tags.sort_by(|a, b| {
        b.completion_rate
            .partial_cmp(&a.completion_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total = due.len() as u32;
    DailyReport {
        date,
        completion_rate: if total > 0 {
            completed as f64 / total as f64
        } else {
            0.0
        },
        total_habits: total,
        completed_habits: completed,
        habit_details,
        tag_stats: tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar;
    use crate::habit::RepetitionPolicy;

    fn date(value: &str) -> NaiveDate {
        calendar::parse_date(value).unwrap()
    }

    fn habit(name: &str, tag: &str, created: &str) -> Habit {
        let mut habit = Habit::new(name, tag);
        habit.created_at = date(created).and_hms_opt(8, 0, 0).unwrap().and_utc();
        habit
    }

    fn rec(habit: &Habit, day: &str, completed: bool) -> CompletionRecord {
        CompletionRecord::new(habit.id.clone(), date(day), completed)
    }

    #[test]
    fn test_empty_when_nothing_due() {
        let report = daily_report(&[], &[], date("2025-03-10"));
        assert_eq!(report.total_habits, 0);
        assert_eq!(report.completed_habits, 0);
        assert_eq!(report.completion_rate, 0.0);
        assert!(report.habit_details.is_empty());
        assert!(report.tag_stats.is_empty());
    }

    #[test]
    fn test_due_filter_excludes_creation_day_archive_and_schedule() {
        let due = habit("Run", "fitness", "2025-03-01");
        let created_today = habit("New", "misc", "2025-03-10");
        let mut archived = habit("Old", "misc", "2025-03-01");
        archived.archived = true;
        // Weekly habit scheduled on Sundays only; 2025-03-10 is a Monday.
        let off_schedule =
            habit("Church", "social", "2025-03-01").with_repetition(RepetitionPolicy::Weekly, vec![0]);

        let report = daily_report(
            &[due, created_today, archived, off_schedule],
            &[],
            date("2025-03-10"),
        );
        assert_eq!(report.total_habits, 1);
        assert_eq!(report.habit_details[0].habit_name, "Run");
    }

    #[test]
    fn test_counter_habit_needs_its_goal_met() {
        let water = habit("Water", "health", "2025-03-01").with_counter_goal(8.0);
        let records = vec![rec(&water, "2025-03-10", true).with_value(5.0)];

        let report = daily_report(&[water], &records, date("2025-03-10"));
        assert_eq!(report.completed_habits, 0);
        assert!(!report.habit_details[0].satisfied);
        assert_eq!(report.habit_details[0].value, Some(5.0));
        assert_eq!(report.completion_rate, 0.0);
    }

    #[test]
    fn test_completion_rate_over_due_habits() {
        let a = habit("A", "one", "2025-03-01");
        let b = habit("B", "one", "2025-03-01");
        let c = habit("C", "two", "2025-03-01");
        let records = vec![rec(&a, "2025-03-10", true), rec(&b, "2025-03-10", false)];

        let report = daily_report(&[a, b, c], &records, date("2025-03-10"));
        assert_eq!(report.total_habits, 3);
        assert_eq!(report.completed_habits, 1);
        assert!((report.completion_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_tag_stats_sorted_by_rate_with_stable_ties() {
        let a = habit("A", "alpha", "2025-03-01");
        let b = habit("B", "alpha", "2025-03-01");
        let c = habit("C", "beta", "2025-03-01");
        let d = habit("D", "gamma", "2025-03-01");
        let records = vec![
            rec(&a, "2025-03-10", true),
            rec(&c, "2025-03-10", true),
            // gamma stays at zero.
        ];

        let report = daily_report(&[a, b, c, d], &records, date("2025-03-10"));
        let tags: Vec<(&str, f64)> = report
            .tag_stats
            .iter()
            .map(|t| (t.tag.as_str(), t.completion_rate))
            .collect();
        // beta (1.0) first, then alpha (0.5), then gamma (0.0).
        assert_eq!(tags[0].0, "beta");
        assert_eq!(tags[1].0, "alpha");
        assert_eq!(tags[2].0, "gamma");
        assert_eq!(report.tag_stats[1].total_habits, 2);
        assert_eq!(report.tag_stats[1].completed_habits, 1);
    }
}
