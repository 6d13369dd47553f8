//! Derived views over the task collection.
//!
//! Everything here borrows the tasks and returns new orderings of
//! references; nothing mutates a record. Time-dependent orderings take the
//! instant explicitly so a view is always consistent with one clock reading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::task::Task;
use crate::timing::effective_elapsed;

/// Sort order for task lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    CreatedAsc,
    #[default]
    CreatedDesc,
    Title,
    /// Effective elapsed, longest first.
    Elapsed,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::CreatedAsc,
        SortMode::CreatedDesc,
        SortMode::Title,
        SortMode::Elapsed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::CreatedAsc => "created-asc",
            SortMode::CreatedDesc => "created-desc",
            SortMode::Title => "title",
            SortMode::Elapsed => "elapsed",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = SortMode::ALL.iter().map(|m| m.as_str()).collect();
                format!("unknown sort mode '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Case-insensitive substring match on title or notes.
///
/// A blank query returns every task. Otherwise the query is matched as
/// given, surrounding whitespace included.
pub fn filter<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    if query.trim().is_empty() {
        return tasks.iter().collect();
    }
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle) || t.notes.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable sort. Equal keys keep their input order.
pub fn sort<'a>(mut tasks: Vec<&'a Task>, mode: SortMode, now: DateTime<Utc>) -> Vec<&'a Task> {
    match mode {
        SortMode::CreatedAsc => tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortMode::CreatedDesc => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Title => tasks.sort_by(|a, b| a.title.cmp(&b.title)),
        SortMode::Elapsed => {
            tasks.sort_by(|a, b| effective_elapsed(b, now).cmp(&effective_elapsed(a, now)))
        }
    }
    tasks
}

/// Active and completed tasks, each in input order.
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    pub active: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

pub fn partition(tasks: Vec<&Task>) -> Partition<'_> {
    let (completed, active): (Vec<&Task>, Vec<&Task>) =
        tasks.into_iter().partition(|t| t.completed);
    Partition { active, completed }
}

/// Aggregate counts and durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub active: usize,
    pub completed: usize,
    /// Effective elapsed summed over active tasks, open intervals included.
    pub active_elapsed_ms: u64,
    pub completed_elapsed_ms: u64,
}

pub fn stats<'a>(tasks: impl IntoIterator<Item = &'a Task>, now: DateTime<Utc>) -> Stats {
    tasks.into_iter().fold(Stats::default(), |mut acc, t| {
        if t.completed {
            acc.completed += 1;
            acc.completed_elapsed_ms = acc.completed_elapsed_ms.saturating_add(t.elapsed_ms);
        } else {
            acc.active += 1;
            acc.active_elapsed_ms = acc
                .active_elapsed_ms
                .saturating_add(effective_elapsed(t, now));
        }
        acc
    })
}

/// A display-ready view: filtered, sorted, split, plus whole-collection stats.
#[derive(Debug, Clone)]
pub struct TaskView<'a> {
    pub active: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
    pub stats: Stats,
    pub now: DateTime<Utc>,
}

pub fn view<'a>(tasks: &'a [Task], query: &str, mode: SortMode, now: DateTime<Utc>) -> TaskView<'a> {
    let Partition { active, completed } = partition(sort(filter(tasks, query), mode, now));
    TaskView {
        active,
        completed,
        stats: stats(tasks, now),
        now,
    }
}
