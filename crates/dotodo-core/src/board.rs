//! The task board: single owner of the task collection.
//!
//! Every mutation goes through a `TaskBoard` method, which applies one
//! transition, returns the resulting [`Event`] and then writes the whole
//! collection back to the [`Store`]. A failed write is logged and
//! remembered but never undoes the in-memory change.

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, warn};

use crate::alert::{self, Alert};
use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::query::{self, SortMode, Stats, TaskView};
use crate::storage::{decode_tasks, encode_tasks, Store};
use crate::task::{NewTask, Task, TaskPatch};
use crate::timing;

pub struct TaskBoard<S, C> {
    tasks: Vec<Task>,
    store: S,
    clock: C,
    last_store_error: Option<String>,
}

impl<S: Store, C: Clock> TaskBoard<S, C> {
    /// Load the collection from `store`. Unreadable data yields an empty board.
    pub fn load(store: S, clock: C) -> Self {
        let bytes = match store.load() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("cannot load tasks, starting empty: {e}");
                None
            }
        };
        let tasks = decode_tasks(bytes.as_deref());
        debug!(count = tasks.len(), "task board loaded");
        Self {
            tasks,
            store,
            clock,
            last_store_error: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current instant, at the millisecond precision records are stored with.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Find a task by full id or by a unique id prefix.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<&Task> {
        if let Some(task) = self.get(id_or_prefix) {
            return Ok(task);
        }
        let needle = id_or_prefix.trim();
        if needle.is_empty() {
            return Err(CoreError::TaskNotFound {
                id: id_or_prefix.to_string(),
            });
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(needle));
        match (matches.next(), matches.count()) {
            (Some(task), 0) => Ok(task),
            (Some(_), rest) => Err(CoreError::AmbiguousId {
                prefix: needle.to_string(),
                matches: rest + 1,
            }),
            (None, _) => Err(CoreError::TaskNotFound {
                id: id_or_prefix.to_string(),
            }),
        }
    }

    pub fn running_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.running).count()
    }

    pub fn effective_elapsed(&self, task: &Task) -> u64 {
        timing::effective_elapsed(task, self.now())
    }

    pub fn view(&self, query: &str, mode: SortMode) -> TaskView<'_> {
        query::view(&self.tasks, query, mode, self.now())
    }

    pub fn stats(&self) -> Stats {
        query::stats(&self.tasks, self.now())
    }

    /// Message of the most recent failed store write, cleared by the next
    /// successful one.
    pub fn last_store_error(&self) -> Option<&str> {
        self.last_store_error.as_deref()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn add(&mut self, input: NewTask) -> Result<Event> {
        let task = Task::new(input, self.now())?;
        let event = Event::TaskAdded {
            task_id: task.id.clone(),
            title: task.title.clone(),
            at: task.created_at,
        };
        debug!(task_id = %task.id, "task added");
        self.tasks.push(task);
        self.persist();
        Ok(event)
    }

    pub fn edit(&mut self, id: &str, patch: TaskPatch) -> Result<Event> {
        let now = self.now();
        let idx = self.index_of(id)?;
        self.tasks[idx].apply_patch(patch)?;
        self.persist();
        Ok(Event::TaskEdited {
            task_id: id.to_string(),
            at: now,
        })
    }

    /// Start the timer. Rejected for running and completed tasks.
    pub fn start(&mut self, id: &str) -> Result<Event> {
        let now = self.now();
        let idx = self.index_of(id)?;
        let event = timing::start(&mut self.tasks[idx], now)?;
        self.persist();
        Ok(event)
    }

    /// Stop the timer. `None` when it was not running.
    pub fn stop(&mut self, id: &str) -> Result<Option<Event>> {
        let now = self.now();
        let idx = self.index_of(id)?;
        let event = timing::stop(&mut self.tasks[idx], now);
        if event.is_some() {
            self.persist();
        }
        Ok(event)
    }

    /// Complete, closing any open interval. `None` when already complete.
    pub fn complete(&mut self, id: &str) -> Result<Option<Event>> {
        let now = self.now();
        let idx = self.index_of(id)?;
        let event = timing::complete(&mut self.tasks[idx], now);
        if event.is_some() {
            self.persist();
        }
        Ok(event)
    }

    /// Reopen a completed task. `None` when it was not complete.
    pub fn uncomplete(&mut self, id: &str) -> Result<Option<Event>> {
        let now = self.now();
        let idx = self.index_of(id)?;
        let event = timing::uncomplete(&mut self.tasks[idx], now);
        if event.is_some() {
            self.persist();
        }
        Ok(event)
    }

    pub fn delete(&mut self, id: &str) -> Result<Event> {
        let now = self.now();
        let idx = self.index_of(id)?;
        let task = self.tasks.remove(idx);
        debug!(task_id = %task.id, "task deleted");
        self.persist();
        Ok(Event::TaskDeleted {
            task_id: task.id,
            at: now,
        })
    }

    /// Remove every completed task.
    pub fn clear_completed(&mut self) -> Event {
        let now = self.now();
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.persist();
        }
        Event::CompletedCleared { removed, at: now }
    }

    /// Run the alert scan at the current instant.
    ///
    /// Alerts come back already marked as fired; deliver them with a
    /// [`crate::alert::Dispatcher`].
    pub fn tick(&mut self) -> Vec<Alert> {
        if self.running_count() == 0 {
            return Vec::new();
        }
        let now = self.now();
        let alerts = alert::scan(&mut self.tasks, now);
        if !alerts.is_empty() {
            self.persist();
        }
        alerts
    }

    /// Re-read the collection, run the alert scan and write back in one
    /// store transaction.
    ///
    /// Use this when other processes share the store: a timer they stopped
    /// between the read and the write cannot be revived by this board. When
    /// the store cannot be read, falls back to [`TaskBoard::tick`] on the
    /// current state.
    pub fn tick_shared(&mut self) -> Vec<Alert> {
        let now = self.now();
        let mut fresh: Option<(Vec<Task>, Vec<Alert>)> = None;
        let result = self.store.update(&mut |bytes| {
            let mut tasks = decode_tasks(bytes);
            let alerts = alert::scan(&mut tasks, now);
            let write = if alerts.is_empty() {
                None
            } else {
                match encode_tasks(&tasks) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        warn!("cannot encode tasks: {e}");
                        None
                    }
                }
            };
            fresh = Some((tasks, alerts));
            write
        });
        match result {
            Ok(()) => self.last_store_error = None,
            Err(e) => {
                warn!("failed to update tasks: {e}");
                self.last_store_error = Some(e.to_string());
            }
        }
        match fresh {
            Some((tasks, alerts)) => {
                self.tasks = tasks;
                alerts
            }
            None => self.tick(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn index_of(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound { id: id.to_string() })
    }

    fn persist(&mut self) {
        let result = encode_tasks(&self.tasks)
            .map_err(CoreError::from)
            .and_then(|bytes| self.store.save(&bytes).map_err(CoreError::from));
        match result {
            Ok(()) => self.last_store_error = None,
            Err(e) => {
                warn!("failed to save tasks: {e}");
                self.last_store_error = Some(e.to_string());
            }
        }
    }
}
