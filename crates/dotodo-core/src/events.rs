use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change on the board produces an Event.
/// The CLI prints them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TaskAdded {
        task_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    TaskEdited {
        task_id: String,
        at: DateTime<Utc>,
    },
    TimerStarted {
        task_id: String,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        task_id: String,
        /// Length of the interval that was just closed.
        added_ms: u64,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        /// Open interval folded in on completion, zero if the timer was idle.
        added_ms: u64,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    TaskReopened {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: String,
        at: DateTime<Utc>,
    },
    CompletedCleared {
        removed: usize,
        at: DateTime<Utc>,
    },
    /// Warning threshold crossed during an open interval.
    AlertRaised {
        task_id: String,
        title: String,
        warning_minutes: f64,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Id of the task this event concerns, if any.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Event::TaskAdded { task_id, .. }
            | Event::TaskEdited { task_id, .. }
            | Event::TimerStarted { task_id, .. }
            | Event::TimerStopped { task_id, .. }
            | Event::TaskCompleted { task_id, .. }
            | Event::TaskReopened { task_id, .. }
            | Event::TaskDeleted { task_id, .. }
            | Event::AlertRaised { task_id, .. } => Some(task_id),
            Event::CompletedCleared { .. } => None,
        }
    }
}
