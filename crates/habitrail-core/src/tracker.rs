//! Tracker service: wires the record store, streak recompute, and the
//! cached analytics entry points together.
//!
//! Every completion write is followed by a synchronous streak recompute
//! for the affected habit and an invalidation of the `analytics:` cache
//! prefix, so reports never serve data older than the last write.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::analytics::{
    self, DailyReport, HabitDetailAnalyzer, HabitDetailReport, HabitSummary, MonthlyReport,
    OverviewAnalyzer, OverviewReport, Period, WeeklyReport,
};
use crate::cache::AnalyticsCache;
use crate::calendar;
use crate::error::{CoreError, Result, ValidationError};
use crate::habit::{CompletionRecord, GoalType, Habit, HabitFilter, RepetitionPolicy};
use crate::storage::{RecordStore, Settings};
use crate::streak::{self, StreakSummary};

const ANALYTICS_PREFIX: &str = "analytics:";

/// Partial habit update. `None` fields keep their current value; the id
/// and creation timestamp are never overwritten. Empty strings clear the
/// optional text fields.
#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub motivation_note: Option<String>,
    pub tag: Option<String>,
    pub repetition: Option<RepetitionPolicy>,
    pub specific_days: Option<Vec<u32>>,
    pub goal_type: Option<GoalType>,
    pub goal_value: Option<f64>,
}

/// One row of a batch completion write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionInput {
    pub habit_id: String,
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(default)]
    pub value: Option<f64>,
}

/// The habit tracking service over an abstract record store.
pub struct Tracker<S: RecordStore> {
    store: S,
    cache: AnalyticsCache,
    reference_date: Option<NaiveDate>,
}

impl<S: RecordStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Tracker {
            store,
            cache: AnalyticsCache::default(),
            reference_date: None,
        }
    }

    pub fn with_settings(store: S, settings: &Settings) -> Self {
        Tracker {
            store,
            cache: AnalyticsCache::new(
                settings.analytics.cache_enabled,
                settings.analytics.cache_ttl_ms(),
            ),
            reference_date: None,
        }
    }

    /// Pin the date treated as "today". Reports and recomputes follow
    /// the wall clock when unset.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn today(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(calendar::today)
    }

    fn invalidate_analytics(&self) {
        let removed = self.cache.invalidate_by_prefix(ANALYTICS_PREFIX);
        if removed > 0 {
            tracing::debug!(entries = removed, "invalidated analytics cache");
        }
    }

    // ----- habits -----

    /// Validate and persist a new habit.
    pub fn add_habit(&mut self, habit: Habit) -> Result<Habit> {
        validate_habit(&habit)?;
        self.store.save_habit(&habit)?;
        self.invalidate_analytics();
        tracing::info!(habit_id = %habit.id, name = %habit.name, "created habit");
        Ok(habit)
    }

    pub fn get_habit(&self, id: &str) -> Result<Habit> {
        self.store
            .get_habit(id)?
            .ok_or_else(|| CoreError::NotFound { id: id.to_string() })
    }

    pub fn list_habits(&self, filter: &HabitFilter) -> Result<Vec<Habit>> {
        Ok(filter.apply(self.store.list_habits()?))
    }

    /// Apply a partial update to a habit.
    pub fn edit_habit(&mut self, id: &str, patch: HabitPatch) -> Result<Habit> {
        let mut habit = self.get_habit(id)?;

        if let Some(name) = patch.name {
            habit.name = name;
        }
        if let Some(description) = patch.description {
            habit.description = if description.is_empty() {
                None
            } else {
                Some(description)
            };
        }
        if let Some(note) = patch.motivation_note {
            habit.motivation_note = if note.is_empty() { None } else { Some(note) };
        }
        if let Some(tag) = patch.tag {
            habit.tag = tag;
        }
        if let Some(repetition) = patch.repetition {
            habit.repetition = repetition;
        }
        if let Some(specific_days) = patch.specific_days {
            habit.specific_days = specific_days;
        }
        if let Some(goal_type) = patch.goal_type {
            habit.goal_type = goal_type;
        }
        if let Some(goal_value) = patch.goal_value {
            habit.goal_value = goal_value;
        }

        validate_habit(&habit)?;
        self.store.save_habit(&habit)?;
        self.invalidate_analytics();
        Ok(habit)
    }

    pub fn archive_habit(&mut self, id: &str) -> Result<Habit> {
        self.set_archived(id, true)
    }

    pub fn restore_habit(&mut self, id: &str) -> Result<Habit> {
        self.set_archived(id, false)
    }

    fn set_archived(&mut self, id: &str, archived: bool) -> Result<Habit> {
        let mut habit = self.get_habit(id)?;
        habit.archived = archived;
        self.store.save_habit(&habit)?;
        self.invalidate_analytics();
        tracing::info!(habit_id = %id, archived, "changed habit archive state");
        Ok(habit)
    }

    /// Delete a habit and its completions. Returns how many completion
    /// records were removed with it.
    pub fn remove_habit(&mut self, id: &str) -> Result<usize> {
        if !self.store.delete_habit(id)? {
            return Err(CoreError::NotFound { id: id.to_string() });
        }
        let removed = self.store.delete_completions_for_habit(id)?;
        self.invalidate_analytics();
        tracing::info!(habit_id = %id, completions_removed = removed, "deleted habit");
        Ok(removed)
    }

    // ----- completions -----

    /// Record (or overwrite) a completion for a habit on a date.
    pub fn record_completion(
        &mut self,
        habit_id: &str,
        date: NaiveDate,
        completed: bool,
        value: Option<f64>,
    ) -> Result<CompletionRecord> {
        self.get_habit(habit_id)?;

        let mut record = CompletionRecord::new(habit_id, date, completed);
        if let Some(value) = value {
            record = record.with_value(value);
        }
        self.store.upsert_completion(&record)?;
        self.recompute_streaks(habit_id)?;
        self.invalidate_analytics();
        tracing::debug!(habit_id = %habit_id, date = %date, completed, "recorded completion");
        Ok(record)
    }

    /// Record a batch of completions in one store cycle, then recompute
    /// each affected habit once.
    pub fn record_completions(&mut self, inputs: &[CompletionInput]) -> Result<Vec<CompletionRecord>> {
        for input in inputs {
            self.get_habit(&input.habit_id)?;
        }

        let records: Vec<CompletionRecord> = inputs
            .iter()
            .map(|input| {
                let mut record =
                    CompletionRecord::new(input.habit_id.clone(), input.date, input.completed);
                if let Some(value) = input.value {
                    record = record.with_value(value);
                }
                record
            })
            .collect();
        self.store.upsert_completions(&records)?;

        let mut recomputed: Vec<&str> = Vec::new();
        for record in &records {
            if !recomputed.contains(&record.habit_id.as_str()) {
                self.recompute_streaks(&record.habit_id)?;
                recomputed.push(record.habit_id.as_str());
            }
        }
        self.invalidate_analytics();
        tracing::debug!(
            records = records.len(),
            habits = recomputed.len(),
            "recorded completion batch"
        );
        Ok(records)
    }

    /// Remove a completion record by id and recompute its habit.
    pub fn remove_completion(&mut self, id: &str) -> Result<()> {
        let record = self
            .store
            .list_completions()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| CoreError::RecordNotFound { id: id.to_string() })?;

        self.store.delete_completion(id)?;
        self.recompute_streaks(&record.habit_id)?;
        self.invalidate_analytics();
        tracing::debug!(habit_id = %record.habit_id, date = %record.date, "removed completion");
        Ok(())
    }

    pub fn list_completions(&self, habit_id: &str) -> Result<Vec<CompletionRecord>> {
        self.get_habit(habit_id)?;
        Ok(self.store.list_completions_for_habit(habit_id)?)
    }

    /// Recompute the habit's derived streak fields from its full
    /// completion history and persist them.
    pub fn recompute_streaks(&mut self, habit_id: &str) -> Result<StreakSummary> {
        let mut habit = self.get_habit(habit_id)?;
        let records = self.store.list_completions_for_habit(habit_id)?;
        let summary = streak::recompute(&habit, &records, self.today());

        habit.current_streak = summary.current_streak;
        habit.best_streak = summary.best_streak;
        habit.current_counter = summary.current_counter;
        self.store.save_habit(&habit)?;

        tracing::debug!(
            habit_id = %habit_id,
            current_streak = summary.current_streak,
            best_streak = summary.best_streak,
            "recomputed streaks"
        );
        Ok(summary)
    }

    // ----- reports -----

    pub fn overview_report(&self) -> Result<OverviewReport> {
        self.memoized("analytics:overview", || {
            let habits = self.store.list_habits()?;
            let completions = self.store.list_completions()?;
            Ok(OverviewAnalyzer::new(self.today()).analyze(&habits, &completions))
        })
    }

    /// Windowed report for one habit. Archived habits are rejected.
    pub fn habit_report(&self, id: &str, period: Period) -> Result<HabitDetailReport> {
        let habit = self.get_habit(id)?;
        if habit.archived {
            return Err(ValidationError::HabitArchived { id: id.to_string() }.into());
        }

        let key = format!("analytics:habit:{id}:{period}");
        self.memoized(&key, || {
            let records = self.store.list_completions_for_habit(id)?;
            Ok(HabitDetailAnalyzer::new(self.today()).analyze(&habit, &records, period))
        })
    }

    pub fn daily_report(&self, date: NaiveDate) -> Result<DailyReport> {
        let key = format!("analytics:daily:{date}");
        self.memoized(&key, || {
            let habits = self.store.list_habits()?;
            let completions = self.store.list_completions()?;
            Ok(analytics::daily_report(&habits, &completions, date))
        })
    }

    pub fn weekly_report(&self, week_start: NaiveDate) -> Result<WeeklyReport> {
        let key = format!("analytics:weekly:{week_start}");
        self.memoized(&key, || {
            let habits = self.store.list_habits()?;
            let completions = self.store.list_completions()?;
            Ok(analytics::weekly_report(&habits, &completions, week_start))
        })
    }

    pub fn monthly_report(&self, year: i32, month: u32) -> Result<MonthlyReport> {
        let key = format!("analytics:monthly:{year}:{month}");
        self.memoized(&key, || {
            let habits = self.store.list_habits()?;
            let completions = self.store.list_completions()?;
            Ok(analytics::monthly_report(&habits, &completions, year, month)?)
        })
    }

    pub fn summary_report(&self, period: Period) -> Result<Vec<HabitSummary>> {
        let key = format!("analytics:habits:{period}");
        self.memoized(&key, || {
            let habits = self.store.list_habits()?;
            let completions = self.store.list_completions()?;
            Ok(analytics::habits_summary(
                &habits,
                &completions,
                period,
                self.today(),
            ))
        })
    }

    fn memoized<T, F>(&self, key: &str, factory: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        let value = self.cache.get_or_set(key, || {
            let report = factory()?;
            Ok(serde_json::to_value(&report)?)
        })?;
        Ok(serde_json::from_value(value)?)
    }
}

fn validate_habit(habit: &Habit) -> Result<(), ValidationError> {
    if habit.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if habit.tag.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "tag".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if habit.goal_type == GoalType::Counter && habit.goal_value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "goal_value".to_string(),
            message: "counter goals need a positive goal value".to_string(),
        });
    }
    match habit.repetition {
        RepetitionPolicy::Weekly if habit.specific_days.iter().any(|d| *d > 6) => {
            Err(ValidationError::InvalidValue {
                field: "specific_days".to_string(),
                message: "weekly days must be 0-6".to_string(),
            })
        }
        RepetitionPolicy::Monthly
            if habit.specific_days.iter().any(|d| !(1..=31).contains(d)) =>
        {
            Err(ValidationError::InvalidValue {
                field: "specific_days".to_string(),
                message: "monthly days must be 1-31".to_string(),
            })
        }
        _ => Ok(()),
    }
}
