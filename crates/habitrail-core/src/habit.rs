//! Habit definitions, completion records, and scheduling predicates.
//!
//! A habit owns its repetition policy (which calendar days it is scheduled
//! on) and its goal type (what counts as a satisfied day). Derived streak
//! state lives on the habit record itself and is refreshed by the tracker
//! after every completion write.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar;

/// How often a habit repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RepetitionPolicy {
    /// Scheduled every day.
    Daily,
    /// Scheduled on specific weekdays (0 = Sunday through 6 = Saturday).
    Weekly,
    /// Scheduled on specific days of the month (1-31).
    Monthly,
}

impl Default for RepetitionPolicy {
    fn default() -> Self {
        RepetitionPolicy::Daily
    }
}

impl RepetitionPolicy {
    /// Whether `date` is a scheduled day under this policy.
    ///
    /// An empty `specific_days` list means every day is scheduled, for
    /// weekly and monthly policies as well as daily.
    pub fn is_active_date(&self, date: NaiveDate, specific_days: &[u32]) -> bool {
        match self {
            RepetitionPolicy::Daily => true,
            _ if specific_days.is_empty() => true,
            RepetitionPolicy::Weekly => specific_days.contains(&calendar::day_of_week(date)),
            RepetitionPolicy::Monthly => specific_days.contains(&calendar::day_of_month(date)),
        }
    }

    /// Largest gap in days between two consecutive recordings that still
    /// counts as an unbroken run. The weekly and monthly bounds are loose
    /// envelopes over the schedule, not exact schedule arithmetic.
    pub fn max_recording_gap_days(&self) -> i64 {
        match self {
            RepetitionPolicy::Daily => 1,
            RepetitionPolicy::Weekly => 7,
            RepetitionPolicy::Monthly => 31,
        }
    }
}

/// What a habit is tracking toward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Binary goal: a day is satisfied when it was marked completed.
    Streak,
    /// Quantified goal: a day is satisfied when the recorded value
    /// reaches the habit's goal value.
    Counter,
}

impl Default for GoalType {
    fn default() -> Self {
        GoalType::Streak
    }
}

/// A tracked habit with its schedule, goal, and derived streak state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier
    pub id: String,
    /// Habit name
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Tag for grouping in reports
    pub tag: String,
    /// Repetition policy
    pub repetition: RepetitionPolicy,
    /// Scheduled weekdays (0-6) or month days (1-31); empty means every day
    #[serde(default)]
    pub specific_days: Vec<u32>,
    /// Goal type (streak/counter)
    pub goal_type: GoalType,
    /// Target value for counter goals; ignored for streak goals
    pub goal_value: f64,
    /// Length of the streak ending at the newest recording (derived)
    pub current_streak: u32,
    /// Longest streak ever observed; never decreases (derived)
    pub best_streak: u32,
    /// Today's recorded value for counter goals (derived)
    #[serde(default)]
    pub current_counter: f64,
    /// Optional motivation note shown alongside the habit
    pub motivation_note: Option<String>,
    /// Whether the habit has been archived; archived habits keep their
    /// history but drop out of reports
    #[serde(default)]
    pub archived: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new daily streak habit with default values.
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        let now = Utc::now();
        Habit {
            id: format!("habit-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            name: name.into(),
            description: None,
            tag: tag.into(),
            repetition: RepetitionPolicy::Daily,
            specific_days: Vec::new(),
            goal_type: GoalType::Streak,
            goal_value: 1.0,
            current_streak: 0,
            best_streak: 0,
            current_counter: 0.0,
            motivation_note: None,
            archived: false,
            created_at: now,
        }
    }

    /// Set the repetition policy and its scheduled days.
    pub fn with_repetition(mut self, repetition: RepetitionPolicy, specific_days: Vec<u32>) -> Self {
        self.repetition = repetition;
        self.specific_days = specific_days;
        self
    }

    /// Turn the habit into a counter goal with the given target value.
    pub fn with_counter_goal(mut self, goal_value: f64) -> Self {
        self.goal_type = GoalType::Counter;
        self.goal_value = goal_value;
        self
    }

    /// Calendar day the habit was created on.
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// Whether the habit's schedule includes `date`.
    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        self.repetition.is_active_date(date, &self.specific_days)
    }

    /// Whether the habit is expected to be recorded on `date`: not
    /// archived, created strictly before `date`, and scheduled on it.
    /// The creation day itself never counts as due.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        !self.archived && self.created_on() < date && self.is_scheduled_on(date)
    }

    /// Scheduled dates within `[start, end]`, excluding the creation day
    /// and anything before it. Ascending.
    pub fn active_dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        calendar::days_between(start, end)
            .into_iter()
            .filter(|date| *date > self.created_on() && self.is_scheduled_on(*date))
            .collect()
    }
}

/// One recording of a habit on a calendar day.
///
/// Recordings are unique per `(habit_id, date)`; writing a second record
/// for the same pair replaces the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Unique identifier
    pub id: String,
    /// Habit this recording belongs to
    pub habit_id: String,
    /// Calendar day the recording is for
    pub date: NaiveDate,
    /// Whether the habit was marked completed that day
    pub completed: bool,
    /// Recorded value for counter goals
    pub value: Option<f64>,
    /// Timestamp the recording was written
    pub completed_at: DateTime<Utc>,
}

impl CompletionRecord {
    /// Create a recording for a habit on a day.
    pub fn new(habit_id: impl Into<String>, date: NaiveDate, completed: bool) -> Self {
        let now = Utc::now();
        CompletionRecord {
            id: format!("rec-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            habit_id: habit_id.into(),
            date,
            completed,
            value: None,
            completed_at: now,
        }
    }

    /// Attach a counter value to the recording.
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

/// Field a habit listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Tag,
    CreatedAt,
    CurrentStreak,
    BestStreak,
}

impl SortField {
    fn parse(name: &str) -> Option<SortField> {
        match name {
            "name" => Some(SortField::Name),
            "tag" => Some(SortField::Tag),
            "created_at" => Some(SortField::CreatedAt),
            "current_streak" => Some(SortField::CurrentStreak),
            "best_streak" => Some(SortField::BestStreak),
            _ => None,
        }
    }
}

/// Filter and sort options for habit listings.
///
/// All criteria are optional and combine with AND. Sort strings use a
/// leading `-` for descending order, e.g. `-best_streak`.
#[derive(Debug, Clone, Default)]
pub struct HabitFilter {
    /// Case-insensitive substring match on name, description, or note
    pub search: Option<String>,
    /// Case-insensitive tag equality
    pub tag: Option<String>,
    /// Keep only archived (`true`) or only unarchived (`false`) habits
    pub archived: Option<bool>,
    /// Sort field
    pub sort: Option<SortField>,
    /// Sort descending instead of ascending
    pub descending: bool,
}

impl HabitFilter {
    pub fn new() -> Self {
        HabitFilter::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    /// Parse a sort string (`field` or `-field`). Unknown fields clear
    /// the sort.
    pub fn with_sort(mut self, sort: &str) -> Self {
        let (name, descending) = match sort.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (sort, false),
        };
        self.sort = SortField::parse(name);
        self.descending = descending && self.sort.is_some();
        self
    }

    fn matches(&self, habit: &Habit) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = habit.name.to_lowercase().contains(&term)
                || habit
                    .description
                    .as_ref()
                    .is_some_and(|d| d.to_lowercase().contains(&term))
                || habit
                    .motivation_note
                    .as_ref()
                    .is_some_and(|n| n.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !habit.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(archived) = self.archived {
            if habit.archived != archived {
                return false;
            }
        }
        true
    }

    /// Apply the filter and sort to a habit list.
    pub fn apply(&self, habits: Vec<Habit>) -> Vec<Habit> {
        let mut result: Vec<Habit> = habits.into_iter().filter(|h| self.matches(h)).collect();
        if let Some(field) = self.sort {
            result.sort_by(|a, b| {
                let ordering = match field {
                    SortField::Name => a.name.cmp(&b.name),
                    SortField::Tag => a.tag.cmp(&b.tag),
                    SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                    SortField::CurrentStreak => a.current_streak.cmp(&b.current_streak),
                    SortField::BestStreak => a.best_streak.cmp(&b.best_streak),
                };
                if self.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        result
    }
}
