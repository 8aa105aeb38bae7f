// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use keyseal_config::KeysealConfig;
use keyseal_core::{KeysealError, SettingsStore};
use rusqlite::Connection;
use tracing::debug;

use crate::migrations::run_migrations;
use crate::queries::settings;

/// How long a statement waits on a lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// An open, migrated settings database.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the database at `path` and apply pending migrations.
    ///
    /// Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>, wal_mode: bool) -> Result<Self, KeysealError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                KeysealError::storage_with(
                    format!("failed to create database directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            KeysealError::storage_with(format!("failed to open database {}", path.display()), e)
        })?;
        let db = Self::init(conn, wal_mode, Some(path.to_path_buf()))?;
        debug!(path = %path.display(), wal_mode, "settings database opened");
        Ok(db)
    }

    /// Open the database configured in `config`.
    pub fn open_with_config(config: &KeysealConfig) -> Result<Self, KeysealError> {
        Self::open(config.database_path(), config.storage.wal_mode)
    }

    /// Private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self, KeysealError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| KeysealError::storage_with("failed to open in-memory database", e))?;
        Self::init(conn, false, None)
    }

    fn init(mut conn: Connection, wal_mode: bool, path: Option<PathBuf>) -> Result<Self, KeysealError> {
        conn.busy_timeout(BUSY_TIMEOUT).map_err(map_sql_err)?;
        if wal_mode {
            let mode: String = conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                .map_err(map_sql_err)?;
            debug!(journal_mode = %mode, "journal mode set");
        }
        run_migrations(&mut conn)?;
        Ok(Self { conn, path })
    }

    /// Path of the database file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Cheap liveness check.
    pub fn ping(&self) -> Result<(), KeysealError> {
        self.conn.execute_batch("SELECT 1;").map_err(map_sql_err)
    }
}

impl SettingsStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, KeysealError> {
        settings::get_setting(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeysealError> {
        settings::set_setting(self, key, value)
    }
}

/// Convert rusqlite errors to [`KeysealError::Storage`].
pub(crate) fn map_sql_err(e: rusqlite::Error) -> KeysealError {
    KeysealError::storage_with(format!("settings database error: {e}"), e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.db");

        let db = Database::open(&path, true).unwrap();
        assert!(path.exists());
        assert_eq!(db.path(), Some(path.as_path()));
        db.ping().unwrap();
    }

    #[test]
    fn wal_mode_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("wal.db"), true).unwrap();
        let mode: String = db
            .connection()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn reopening_does_not_rerun_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.db");
        {
            let db = Database::open(&path, false).unwrap();
            db.set("language", "en").unwrap();
        }
        let db = Database::open(&path, false).unwrap();
        assert_eq!(db.get("language").unwrap().as_deref(), Some("en"));
    }

    #[test]
    fn open_on_a_directory_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Database::open(dir.path(), false).unwrap_err();
        assert!(err.is_storage());
    }
}
