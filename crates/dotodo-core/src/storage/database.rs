//! SQLite-backed key-value storage.
//!
//! The task collection lives as one JSON blob under a single key in the
//! `kv` table. There is no per-task schema: every save rewrites the blob.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, TransactionBehavior};

use super::{data_dir, Store, TASKS_KEY};
use crate::error::StoreError;

/// SQLite database holding the `kv` table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/dotodo.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        Self::open_at(&Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf, StoreError> {
        Ok(data_dir()?.join("dotodo.db"))
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        read_kv(&self.conn, key)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        write_kv(&self.conn, key, value)
    }

    /// Run `apply` on the value under `key` inside a `BEGIN IMMEDIATE`
    /// transaction, writing its result if it returns one.
    ///
    /// The write lock is held from the read to the commit, so no other
    /// connection can commit in between.
    pub fn kv_update(
        &mut self,
        key: &str,
        apply: &mut dyn FnMut(Option<&[u8]>) -> Option<Vec<u8>>,
    ) -> Result<(), StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = read_kv(&tx, key)?;
        if let Some(bytes) = apply(current.as_deref()) {
            write_kv(&tx, key, &bytes)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn read_kv(conn: &Connection, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get::<_, Vec<u8>>(0));
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_kv(conn: &Connection, key: &str, value: &[u8]) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

/// A [`Store`] bound to one key of a [`Database`].
pub struct SqliteStore {
    db: Database,
    key: String,
}

impl SqliteStore {
    /// Store the task collection under the default key.
    pub fn new(db: Database) -> Self {
        Self::with_key(db, TASKS_KEY)
    }

    pub fn with_key(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl Store for SqliteStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.db.kv_get(&self.key)
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        self.db.kv_set(&self.key, bytes)
    }

    fn update(
        &mut self,
        apply: &mut dyn FnMut(Option<&[u8]>) -> Option<Vec<u8>>,
    ) -> Result<(), StoreError> {
        self.db.kv_update(&self.key, apply)
    }
}
