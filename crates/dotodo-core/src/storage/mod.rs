mod config;
pub mod database;

pub use config::{Config, NotificationsConfig, TickerConfig, ViewConfig};
pub use database::{Database, SqliteStore};

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::error::StoreError;
use crate::task::Task;

/// Storage key for the serialized task collection.
pub const TASKS_KEY: &str = "dotodo.tasks";

/// Durable byte storage for the task collection.
pub trait Store {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;
    fn save(&mut self, bytes: &[u8]) -> Result<(), StoreError>;

    /// Read-modify-write. `apply` sees the current bytes and returns the
    /// replacement, or `None` to leave the store untouched.
    ///
    /// Stores shared between processes override this to run atomically.
    fn update(
        &mut self,
        apply: &mut dyn FnMut(Option<&[u8]>) -> Option<Vec<u8>>,
    ) -> Result<(), StoreError> {
        let current = self.load()?;
        if let Some(bytes) = apply(current.as_deref()) {
            self.save(&bytes)?;
        }
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `DOTODO_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/dotodo[-dev]/`, with `DOTODO_ENV=dev` selecting the dev dir.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let dir = match std::env::var_os("DOTODO_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DOTODO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dotodo-dev")
            } else {
                base_dir.join("dotodo")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StoreError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Serialize the whole collection as one JSON array.
pub fn encode_tasks(tasks: &[Task]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(tasks)
}

/// Parse a stored collection.
///
/// Missing, empty or unparsable data yields an empty collection. Records
/// that violate the task invariants are repaired; records that cannot be
/// repaired and duplicate ids are dropped.
pub fn decode_tasks(bytes: Option<&[u8]>) -> Vec<Task> {
    let Some(bytes) = bytes else {
        return Vec::new();
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Vec::new();
    }
    let parsed: Vec<Task> = match serde_json::from_slice(bytes) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!("stored tasks are unreadable, starting empty: {e}");
            return Vec::new();
        }
    };

    let mut seen = std::collections::HashSet::new();
    let mut tasks = Vec::with_capacity(parsed.len());
    for mut task in parsed {
        if !task.normalize() {
            warn!(task_id = %task.id, "dropping unusable stored task");
            continue;
        }
        if !seen.insert(task.id.clone()) {
            warn!(task_id = %task.id, "dropping duplicate stored task");
            continue;
        }
        tasks.push(task);
    }
    tasks
}

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    bytes: Option<Vec<u8>>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::default();
        store.lock().bytes = Some(bytes.into());
        store
    }

    /// A store whose every save fails.
    pub fn failing() -> Self {
        let store = Self::default();
        store.lock().fail_writes = true;
        store
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.lock().bytes.clone()
    }

    /// Number of successful saves.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock().bytes.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StoreError::QueryFailed("memory store rejects writes".into()));
        }
        inner.bytes = Some(bytes.to_vec());
        inner.writes += 1;
        Ok(())
    }
}
