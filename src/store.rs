//! Prompt-gate persistence.
//!
//! A tiny key-value store recording the last day key each prompt kind was
//! shown. The SQLite file lives at `~/.fitday/state.db` and is a disposable
//! cache: losing it only means a prompt may show one extra time, so every
//! caller treats the store as best-effort.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection};
use thiserror::Error;

/// Errors specific to gate-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create state directory: {0}")]
    CreateDir(std::io::Error),
}

/// Get/set string state by logical prompt name. Injected into the scheduler
/// so tests can fake persistence and hosts can swap backends.
pub trait GateStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// SQLite-backed store
// ---------------------------------------------------------------------------

/// Gate store backed by a single `prompt_gates` table.
pub struct SqliteGateStore {
    conn: Connection,
}

impl SqliteGateStore {
    /// Open (creating if needed) the store at `~/.fitday/state.db`.
    pub fn open() -> Result<Self, StoreError> {
        let path = default_path()?;
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(StoreError::CreateDir)?;
            }
        }
        Self::open_at(path)
    }

    /// Open at an explicit path. Used by tests.
    pub fn open_at(path: PathBuf) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS prompt_gates (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }
}

impl GateStore for SqliteGateStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM prompt_gates WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let now = Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        self.conn.execute(
            "INSERT INTO prompt_gates (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }
}

/// `~/.fitday/state.db`
fn default_path() -> Result<PathBuf, StoreError> {
    let home = dirs::home_dir().ok_or(StoreError::HomeDirNotFound)?;
    Ok(home.join(".fitday").join("state.db"))
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory gate store for tests and store-less degradation.
#[derive(Debug, Default)]
pub struct MemoryGateStore {
    values: HashMap<String, String>,
}

impl MemoryGateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GateStore for MemoryGateStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// Shared test utilities
// =============================================================================

#[cfg(test)]
pub mod test_utils {
    use super::SqliteGateStore;

    /// Create a temporary on-disk store for testing.
    ///
    /// We leak the `TempDir` so the directory persists for the duration of the
    /// test; the OS cleans up test temp dirs.
    pub fn test_store() -> SqliteGateStore {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test-state.db");
        std::mem::forget(dir);
        SqliteGateStore::open_at(path).expect("Failed to open test store")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::test_utils::test_store;
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let store = test_store();
        assert!(store.get("endOfDayPromptDate").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let mut store = test_store();
        store.set("endOfDayPromptDate", "2026-08-30").unwrap();
        assert_eq!(
            store.get("endOfDayPromptDate").unwrap().as_deref(),
            Some("2026-08-30")
        );
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = test_store();
        store.set("checklistPromptDate", "2026-08-29").unwrap();
        store.set("checklistPromptDate", "2026-08-30").unwrap();
        assert_eq!(
            store.get("checklistPromptDate").unwrap().as_deref(),
            Some("2026-08-30")
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let mut store = test_store();
        store.set("endOfDayPromptDate", "2026-08-30").unwrap();
        assert!(store.get("checklistPromptDate").unwrap().is_none());
        assert!(store.get("coachGreetingDay").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryGateStore::new();
        assert!(store.get("coachGreetingDay").unwrap().is_none());
        store.set("coachGreetingDay", "2026-08-30").unwrap();
        assert_eq!(
            store.get("coachGreetingDay").unwrap().as_deref(),
            Some("2026-08-30")
        );
    }
}
