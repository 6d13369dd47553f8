//! Warning-threshold alerts.
//!
//! Each task runs a two-state machine per open interval:
//!
//! ```text
//! Idle --(running, threshold set, elapsed >= threshold, !warned)--> Crossed
//! ```
//!
//! Detecting `Crossed` sets `warned`, which drops the task back to `Idle` for
//! the rest of the interval. Only [`crate::timing::start`] clears `warned`, so
//! each interval alerts at most once.

pub mod dispatch;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::events::Event;
use crate::task::Task;
use crate::timing::effective_elapsed;

pub use dispatch::{
    Delivery, Dispatcher, NativeNotifier, Notifier, Permission, Toast, ToastQueue,
};

/// Title used for every native notification.
pub const ALERT_TITLE: &str = "Do Todo \u{2014} Time Alert";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Idle,
    Crossed,
}

/// A threshold crossing, ready to hand to a [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub task_id: String,
    pub title: String,
    pub warning_minutes: f64,
    pub elapsed_ms: u64,
    pub at: DateTime<Utc>,
}

impl Alert {
    /// Body text: `"<title>" reached <N> min`. Whole minutes print without a
    /// fractional part.
    pub fn message(&self) -> String {
        format!("\"{}\" reached {} min", self.title, self.warning_minutes)
    }

    pub fn to_event(&self) -> Event {
        Event::AlertRaised {
            task_id: self.task_id.clone(),
            title: self.title.clone(),
            warning_minutes: self.warning_minutes,
            elapsed_ms: self.elapsed_ms,
            at: self.at,
        }
    }
}

/// Where a task sits in the alert state machine at `now`.
pub fn alert_state(task: &Task, now: DateTime<Utc>) -> AlertState {
    if !task.running || task.warned {
        return AlertState::Idle;
    }
    match task.warning_threshold_ms() {
        Some(threshold) if effective_elapsed(task, now) >= threshold => AlertState::Crossed,
        _ => AlertState::Idle,
    }
}

/// Scan every running task and fire the crossings.
///
/// Tasks that cross are marked `warned` before the alert is returned, so a
/// later delivery failure cannot cause a second alert for the same interval.
pub fn scan(tasks: &mut [Task], now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for task in tasks.iter_mut().filter(|t| t.running) {
        if alert_state(task, now) != AlertState::Crossed {
            continue;
        }
        let Some(warning_minutes) = task.warning_minutes else {
            continue;
        };
        task.warned = true;
        let alert = Alert {
            task_id: task.id.clone(),
            title: task.title.clone(),
            warning_minutes,
            elapsed_ms: effective_elapsed(task, now),
            at: now,
        };
        info!(task_id = %alert.task_id, minutes = warning_minutes, "warning threshold reached");
        alerts.push(alert);
    }
    alerts
}
