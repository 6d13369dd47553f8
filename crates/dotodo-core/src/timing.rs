//! Timing engine.
//!
//! Pure transitions over a single [`Task`]. The engine never reads the clock
//! itself: every operation takes the instant to act at, and the caller is
//! responsible for supplying it (normally from a [`crate::clock::Clock`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --stop--> Idle
//!   |                |
//!   +---complete-----+--complete--> Completed --uncomplete--> Idle
//! ```
//!
//! Starting a running or completed task is rejected rather than treated as a
//! restart, since restarting would drop the open interval.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::TimingError;
use crate::events::Event;
use crate::task::Task;

/// Effective elapsed milliseconds at `now`: closed intervals plus the open one.
///
/// An open interval that appears to start in the future counts as zero.
pub fn effective_elapsed(task: &Task, now: DateTime<Utc>) -> u64 {
    match (task.running, task.started_at) {
        (true, Some(started)) => task.elapsed_ms.saturating_add(interval_ms(started, now)),
        _ => task.elapsed_ms,
    }
}

/// Open a new interval and re-arm the warning.
pub fn start(task: &mut Task, now: DateTime<Utc>) -> Result<Event, TimingError> {
    if task.completed {
        return Err(TimingError::Completed);
    }
    if task.running {
        return Err(TimingError::AlreadyRunning);
    }
    task.running = true;
    task.started_at = Some(now);
    task.warned = false;
    debug!(task_id = %task.id, "timer started");
    Ok(Event::TimerStarted {
        task_id: task.id.clone(),
        elapsed_ms: task.elapsed_ms,
        at: now,
    })
}

/// Close the open interval. Returns `None` when the task was not running.
pub fn stop(task: &mut Task, now: DateTime<Utc>) -> Option<Event> {
    let added_ms = fold_open_interval(task, now)?;
    debug!(task_id = %task.id, added_ms, "timer stopped");
    Some(Event::TimerStopped {
        task_id: task.id.clone(),
        added_ms,
        elapsed_ms: task.elapsed_ms,
        at: now,
    })
}

/// Mark complete, folding in any open interval first.
///
/// Returns `None` when the task is already complete, leaving `completed_at`
/// untouched.
pub fn complete(task: &mut Task, now: DateTime<Utc>) -> Option<Event> {
    if task.completed {
        return None;
    }
    let added_ms = fold_open_interval(task, now).unwrap_or(0);
    task.completed = true;
    task.completed_at = Some(now);
    debug!(task_id = %task.id, added_ms, "task completed");
    Some(Event::TaskCompleted {
        task_id: task.id.clone(),
        added_ms,
        elapsed_ms: task.elapsed_ms,
        at: now,
    })
}

/// Undo completion. The timer stays stopped.
pub fn uncomplete(task: &mut Task, now: DateTime<Utc>) -> Option<Event> {
    if !task.completed {
        return None;
    }
    task.completed = false;
    task.completed_at = None;
    debug!(task_id = %task.id, "task reopened");
    Some(Event::TaskReopened {
        task_id: task.id.clone(),
        at: now,
    })
}

// ── Internal ─────────────────────────────────────────────────────

fn fold_open_interval(task: &mut Task, now: DateTime<Utc>) -> Option<u64> {
    if !task.running {
        return None;
    }
    let added = task.started_at.map(|s| interval_ms(s, now)).unwrap_or(0);
    task.elapsed_ms = task.elapsed_ms.saturating_add(added);
    task.running = false;
    task.started_at = None;
    Some(added)
}

/// Milliseconds from `from` to `to`, clamped at zero against clock skew.
pub(crate) fn interval_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_milliseconds()).unwrap_or(0)
}
