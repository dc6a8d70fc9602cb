//! Process-wide application state.
//!
//! `CoreState` owns the database location and its one-time schema setup.
//! Handlers open a fresh connection per request via `open_db()`; migrations
//! run exactly once behind the `initialize()` latch, which is lazy and safe
//! to call any number of times. `shutdown()` is the explicit teardown hook.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config;
use crate::db;

/// Shared between all request handlers. Wrapped in `Arc` at startup.
pub struct CoreState {
    db_path: PathBuf,
    /// One-time schema initialization latch.
    initialized: Mutex<bool>,
}

impl CoreState {
    /// Create a CoreState pointing at the configured database path.
    pub fn new() -> Self {
        Self::with_db_path(config::database_path())
    }

    /// Create a CoreState for an explicit database path (tests, tooling).
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            initialized: Mutex::new(false),
        }
    }

    /// Run schema migrations once. Subsequent calls are no-ops, so callers
    /// may invoke this lazily without coordination.
    pub fn initialize(&self) -> Result<(), CoreError> {
        let mut done = self
            .initialized
            .lock()
            .map_err(|_| CoreError::LockPoisoned)?;
        if *done {
            return Ok(());
        }

        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::DataDir(e.to_string()))?;
        }

        let conn = db::open_database(&self.db_path)?;
        db::run_migrations(&conn)?;
        drop(conn);

        *done = true;
        tracing::info!(path = %self.db_path.display(), "Database initialized");
        Ok(())
    }

    /// Open a connection for one request. Initializes the schema lazily if
    /// `initialize()` has not run yet.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        self.initialize()?;
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Explicit shutdown hook. Connections are per-request so there is no
    /// pooled handle to close; the latch is reset so a later `open_db`
    /// re-verifies the schema.
    pub fn shutdown(&self) {
        if let Ok(mut done) = self.initialized.lock() {
            *done = false;
        }
        tracing::info!("Core state shut down");
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Cannot create data directory: {0}")]
    DataDir(String),
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_state() -> (CoreState, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let state = CoreState::with_db_path(tmp.path().join("odonta.db"));
        (state, tmp)
    }

    #[test]
    fn initialize_creates_schema() {
        let (state, _tmp) = temp_state();
        state.initialize().unwrap();

        let conn = state.open_db().unwrap();
        let count = db::count_tables(&conn).unwrap();
        assert!(count >= 5, "Expected at least 5 tables, got {count}");
    }

    #[test]
    fn initialize_is_idempotent() {
        let (state, _tmp) = temp_state();
        state.initialize().unwrap();
        state.initialize().unwrap();
        state.initialize().unwrap();

        let conn = state.open_db().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn open_db_initializes_lazily() {
        let (state, _tmp) = temp_state();
        // No explicit initialize() call
        let conn = state.open_db().unwrap();
        let count = db::count_tables(&conn).unwrap();
        assert!(count >= 5);
    }

    #[test]
    fn open_db_after_shutdown_reinitializes() {
        let (state, _tmp) = temp_state();
        state.initialize().unwrap();
        state.shutdown();

        let conn = state.open_db().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn initialize_creates_missing_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let state = CoreState::with_db_path(tmp.path().join("nested/dir/odonta.db"));
        state.initialize().unwrap();
        assert!(state.db_path().exists());
    }
}
