//! Core error types for habitrail-core.
//!
//! Most engine computations return values rather than errors: missing
//! optional data degrades to documented defaults and inverted date
//! ranges yield empty results. The variants here cover unresolvable
//! references, malformed input, and storage or configuration failures.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitrail-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Referenced habit id does not exist
    #[error("Habit not found: {id}")]
    NotFound { id: String },

    /// Referenced completion record id does not exist
    #[error("Completion record not found: {id}")]
    RecordNotFound { id: String },

    /// Record-store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Record-store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing data
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Read from the backing data failed
    #[error("Failed to read store data: {0}")]
    ReadFailed(String),

    /// Write to the backing data failed
    #[error("Failed to write store data: {0}")]
    WriteFailed(String),

    /// A store lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key passed to get/set
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Malformed calendar date string
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// Month outside the 1-12 range
    #[error("Invalid month {month}: expected 1-12")]
    InvalidMonth { month: u32 },

    /// Analytics requested for an archived habit
    #[error("Habit '{id}' is archived and cannot be analyzed")]
    HabitArchived { id: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// Helper implementations for converting from other error types

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::LockPoisoned
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
