//! SQLite-backed key-value storage.
//!
//! The application keeps its durable state in named slots of a single `kv`
//! table: the focus session list under [`SESSIONS_KEY`], and whatever else a
//! host chooses to save (the CLI keeps its timer snapshot here).

use std::path::Path;

use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::session::SessionSlot;

/// Slot holding the JSON array of focus sessions.
pub const SESSIONS_KEY: &str = "focus_sessions";

/// SQLite database for slot storage.
pub struct Database {
    conn: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Database {
    /// Open the database at `<data_dir>/todopro.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("todopro.db"))
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl SessionSlot for Database {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.kv_get(SESSIONS_KEY)?)
    }

    fn write(&self, contents: &str) -> Result<()> {
        Ok(self.kv_set(SESSIONS_KEY, contents)?)
    }

    fn clear(&self) -> Result<()> {
        Ok(self.kv_delete(SESSIONS_KEY)?)
    }
}
