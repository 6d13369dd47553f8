//! Task record model.
//!
//! A [`Task`] carries its own time accounting: `elapsed_ms` holds the sum of
//! every finished interval and `started_at` marks the open one, if any. The
//! fields are public for serialization and display; mutate them through
//! [`crate::timing`] and [`crate::board::TaskBoard`] so the invariants hold:
//!
//! - `running` is true iff `started_at` is set
//! - a completed task is never running
//! - `warned` is cleared whenever a new interval opens

use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// One user-created to-do item.
///
/// Serializes with camelCase keys and epoch-millisecond instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, immutable
    pub id: String,
    /// Trimmed, never empty
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, with = "ts_milliseconds_option")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub running: bool,
    /// Accumulated milliseconds from closed intervals only
    #[serde(default)]
    pub elapsed_ms: u64,
    /// Start of the open interval
    #[serde(default, with = "ts_milliseconds_option")]
    pub started_at: Option<DateTime<Utc>>,
    /// Alert threshold for the current or next run
    #[serde(default)]
    pub warning_minutes: Option<f64>,
    /// Whether the threshold alert already fired for the open interval
    #[serde(default)]
    pub warned: bool,
}

/// Coarse display state derived from the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Done => write!(f, "done"),
        }
    }
}

impl Task {
    /// Build a fresh task from validated input.
    pub fn new(input: NewTask, created_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let title = clean_title(&input.title).ok_or(ValidationError::EmptyTitle)?;
        validate_warning(input.warning_minutes)?;
        Ok(Task {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            notes: input.notes,
            completed: false,
            completed_at: None,
            created_at,
            running: false,
            elapsed_ms: 0,
            started_at: None,
            warning_minutes: input.warning_minutes,
            warned: false,
        })
    }

    pub fn status(&self) -> TaskStatus {
        if self.completed {
            TaskStatus::Done
        } else if self.running {
            TaskStatus::Running
        } else {
            TaskStatus::Pending
        }
    }

    /// Threshold in milliseconds, if one is set.
    pub fn warning_threshold_ms(&self) -> Option<u64> {
        self.warning_minutes.map(|m| (m * 60_000.0) as u64)
    }

    /// Apply an edit. A title that trims to empty keeps the previous one.
    pub fn apply_patch(&mut self, patch: TaskPatch) -> Result<(), ValidationError> {
        if let WarningPatch::Set(minutes) = patch.warning_minutes {
            validate_warning(Some(minutes))?;
        }
        if let Some(title) = patch.title.as_deref().and_then(clean_title) {
            self.title = title;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        match patch.warning_minutes {
            WarningPatch::Keep => {}
            WarningPatch::Clear => self.warning_minutes = None,
            WarningPatch::Set(minutes) => self.warning_minutes = Some(minutes),
        }
        Ok(())
    }

    /// Repair a record loaded from storage so the invariants hold again.
    ///
    /// Returns `false` when the record is unusable (empty id or title).
    pub(crate) fn normalize(&mut self) -> bool {
        if self.id.trim().is_empty() {
            return false;
        }
        match clean_title(&self.title) {
            Some(title) => self.title = title,
            None => return false,
        }
        if self.running != self.started_at.is_some() {
            self.running = false;
            self.started_at = None;
        }
        if self.completed && self.running {
            // Fold the open interval the way completing would have.
            if let (Some(started), Some(done)) = (self.started_at, self.completed_at) {
                self.elapsed_ms = self
                    .elapsed_ms
                    .saturating_add(crate::timing::interval_ms(started, done));
            }
            self.running = false;
            self.started_at = None;
        }
        if !self.completed {
            self.completed_at = None;
        }
        if validate_warning(self.warning_minutes).is_err() {
            self.warning_minutes = None;
        }
        true
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub notes: String,
    pub warning_minutes: Option<f64>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn warn_after(mut self, minutes: impl Into<f64>) -> Self {
        self.warning_minutes = Some(minutes.into());
        self
    }
}

/// An edit to title, notes or warning threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub warning_minutes: WarningPatch,
}

/// Tri-state edit of the warning threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum WarningPatch {
    #[default]
    Keep,
    Clear,
    Set(f64),
}

fn clean_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Thresholds may be fractional but must be finite and above zero.
fn validate_warning(minutes: Option<f64>) -> Result<(), ValidationError> {
    match minutes {
        Some(m) if !(m.is_finite() && m > 0.0) => Err(ValidationError::InvalidValue {
            field: "warningMinutes".into(),
            message: "must be a positive number of minutes".into(),
        }),
        _ => Ok(()),
    }
}
