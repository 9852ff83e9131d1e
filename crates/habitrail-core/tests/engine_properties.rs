//! Property tests for the calendar and streak primitives.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use habitrail_core::{calendar, streak, CompletionRecord, Habit, RepetitionPolicy};

fn any_policy() -> impl Strategy<Value = RepetitionPolicy> {
    prop_oneof![
        Just(RepetitionPolicy::Daily),
        Just(RepetitionPolicy::Weekly),
        Just(RepetitionPolicy::Monthly),
    ]
}

/// Sparse history: day offsets from a base date with a completed flag.
/// Offsets may collide, in which case the later record wins.
fn any_history() -> impl Strategy<Value = Vec<(u64, bool)>> {
    proptest::collection::vec((0u64..120, proptest::bool::ANY), 0..40)
}

fn records_from(habit: &Habit, base: NaiveDate, entries: &[(u64, bool)]) -> Vec<CompletionRecord> {
    entries
        .iter()
        .filter_map(|&(offset, completed)| {
            let date = base.checked_add_days(Days::new(offset))?;
            Some(CompletionRecord::new(habit.id.clone(), date, completed))
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_days_between_is_inclusive_and_consecutive(
        year in 2000i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
        offset in 0u64..500,
    ) {
        let start = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let end = start.checked_add_days(Days::new(offset)).unwrap();

        let days = calendar::days_between(start, end);
        prop_assert_eq!(days.len() as u64, offset + 1);
        prop_assert_eq!(days.len() as i64, calendar::gap_days(start, end) + 1);
        prop_assert_eq!(days[0], start);
        prop_assert_eq!(*days.last().unwrap(), end);
        prop_assert!(days.windows(2).all(|w| calendar::gap_days(w[0], w[1]) == 1));
    }

    #[test]
    fn prop_inverted_window_is_empty(
        year in 2000i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
        offset in 1u64..500,
    ) {
        let start = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let end = start.checked_add_days(Days::new(offset)).unwrap();
        prop_assert!(calendar::days_between(end, start).is_empty());
    }

    #[test]
    fn prop_streak_runs_partition_satisfied_days(
        entries in any_history(),
        policy in any_policy(),
    ) {
        let habit = Habit::new("Prop", "general").with_repetition(policy, Vec::new());
        let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let records = records_from(&habit, base, &entries);

        let status = streak::daily_status_map(&habit, &records);
        let runs = streak::all_streak_runs(&status, policy);
        let satisfied = status.values().filter(|s| **s).count() as u32;

        // Every satisfied day belongs to exactly one run, and the
        // current streak can never beat the longest run.
        prop_assert_eq!(runs.iter().sum::<u32>(), satisfied);
        let current = streak::current_streak(&status, policy);
        prop_assert!(current <= runs.iter().copied().max().unwrap_or(0));
    }

    #[test]
    fn prop_counter_goal_is_an_at_least_threshold(goal in 1u32..200) {
        let goal = f64::from(goal);
        let habit = Habit::new("Prop", "general").with_counter_goal(goal);
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let rec = |value: f64| CompletionRecord::new(habit.id.clone(), day, true).with_value(value);

        prop_assert!(!streak::is_satisfied(&habit, Some(&rec(goal - 1.0))));
        prop_assert!(streak::is_satisfied(&habit, Some(&rec(goal))));
        prop_assert!(streak::is_satisfied(&habit, Some(&rec(goal + 1.0))));
    }

    #[test]
    fn prop_recompute_keeps_best_streak_at_or_above_floor(
        entries in any_history(),
        stored_best in 0u32..50,
    ) {
        let mut habit = Habit::new("Prop", "general");
        habit.best_streak = stored_best;
        let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let records = records_from(&habit, base, &entries);

        let today = base.checked_add_days(Days::new(130)).unwrap();
        let summary = streak::recompute(&habit, &records, today);
        prop_assert!(summary.best_streak >= stored_best);
        prop_assert!(summary.best_streak >= summary.current_streak);
    }
}
