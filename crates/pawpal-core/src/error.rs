//! Core error types for pawpal-core.
//!
//! Construction and insertion problems surface as [`ValidationError`];
//! lookups that miss surface as [`CoreError::NotFound`]. Scheduling itself
//! never fails: tasks that cannot be placed and overlapping attempts are
//! reported through the returned schedule and its warnings.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pawpal-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A lookup by id found nothing
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn task_not_found(id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind: "Task",
            id: id.into(),
        }
    }
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home directory could not be resolved
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Start time ({start}) must be before end time ({end})")]
    InvalidTimeRange {
        start: chrono::NaiveTime,
        end: chrono::NaiveTime,
    },

    /// Invalid placement range
    #[error("Scheduled start ({start}) must be before scheduled end ({end})")]
    InvalidPlacement {
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    },

    /// Placement length disagrees with the task duration
    #[error("Placement of {actual} minutes does not match task duration of {expected} minutes")]
    DurationMismatch { expected: i64, actual: i64 },

    /// Duplicate identifier in a collection
    #[error("{collection} with id {id} already exists")]
    DuplicateId { collection: &'static str, id: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Reject blank identity fields.
    pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), Self> {
        if value.trim().is_empty() {
            Err(Self::invalid(field, "must not be empty"))
        } else {
            Ok(())
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
