//! Core error types for dotodo-core.
//!
//! Every failure path in the core degrades to a safe default; these types
//! describe the mutations that were rejected and the I/O that did not
//! happen, so the caller can decide how loudly to report them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dotodo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Rejected timer transitions
    #[error("Timer error: {0}")]
    Timing(#[from] TimingError),

    /// No task carries the given id
    #[error("Task not found: {id}")]
    TaskNotFound { id: String },

    /// An id prefix matched more than one task
    #[error("Id prefix '{prefix}' is ambiguous ({matches} tasks match)")]
    AmbiguousId { prefix: String, matches: usize },

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another writer
    #[error("Store is locked")]
    Locked,

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
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
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Title was empty after trimming
    #[error("Task title must not be empty")]
    EmptyTitle,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Timer transitions the engine refuses to perform.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    /// Starting again would discard the open interval.
    #[error("task is already running")]
    AlreadyRunning,

    /// Completed tasks cannot accumulate time.
    #[error("task is completed")]
    Completed,
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The user or platform denied notification permission
    #[error("notification permission denied")]
    PermissionDenied,

    /// No native notification channel exists on this platform
    #[error("native notifications unavailable: {0}")]
    Unavailable(String),

    /// The notifier ran but reported failure
    #[error("notification delivery failed: {0}")]
    DeliveryFailed(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
