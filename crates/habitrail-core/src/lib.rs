//! # Habitrail Core Library
//!
//! This library provides the core business logic for the Habitrail
//! habit tracker. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary over the same
//! core library.
//!
//! ## Architecture
//!
//! - **Streak Engine**: Pure functions turning sparse per-habit
//!   completion records into streak counts under three repetition
//!   policies and two goal types
//! - **Analytics**: Overview, per-habit, daily, weekly, monthly, and
//!   all-habits reports as plain serializable records, memoized by a
//!   TTL cache
//! - **Storage**: An abstract record store (in-memory implementation
//!   included) and TOML-based settings
//! - **Tracker**: The service wiring writes, synchronous streak
//!   recompute, and cache invalidation together
//!
//! ## Key Components
//!
//! - [`Tracker`]: Habit and completion operations plus report entry points
//! - [`Habit`] / [`CompletionRecord`]: The two persisted record types
//! - [`AnalyticsCache`]: Keyed report cache with prefix invalidation
//! - [`Settings`]: Application configuration management

pub mod analytics;
pub mod cache;
pub mod calendar;
pub mod error;
pub mod habit;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use analytics::{
    DailyReport, HabitDetailReport, HabitSummary, MonthlyReport, OverviewReport, Period,
    WeeklyReport,
};
pub use cache::AnalyticsCache;
pub use error::{ConfigError, CoreError, Result, StoreError, ValidationError};
pub use habit::{CompletionRecord, GoalType, Habit, HabitFilter, RepetitionPolicy};
pub use storage::{MemoryStore, RecordStore, Settings};
pub use streak::StreakSummary;
pub use tracker::{CompletionInput, HabitPatch, Tracker};
