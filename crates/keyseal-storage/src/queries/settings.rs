// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings CRUD operations.

use keyseal_core::KeysealError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_sql_err, Database};

/// Get a setting by key. A stored NULL reads as an empty string.
pub fn get_setting(db: &Database, key: &str) -> Result<Option<String>, KeysealError> {
    let value: Option<Option<String>> = db
        .connection()
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(map_sql_err)?;
    Ok(value.map(Option::unwrap_or_default))
}

/// Insert or replace a setting.
pub fn set_setting(db: &Database, key: &str, value: &str) -> Result<(), KeysealError> {
    db.connection()
        .execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map_err(map_sql_err)?;
    Ok(())
}

/// Delete a setting. Returns whether a row was removed.
pub fn delete_setting(db: &Database, key: &str) -> Result<bool, KeysealError> {
    let removed = db
        .connection()
        .execute("DELETE FROM settings WHERE key = ?1", params![key])
        .map_err(map_sql_err)?;
    Ok(removed > 0)
}

/// List all stored keys in ascending order.
pub fn list_setting_keys(db: &Database) -> Result<Vec<String>, KeysealError> {
    let conn = db.connection();
    let mut stmt = conn
        .prepare("SELECT key FROM settings ORDER BY key")
        .map_err(map_sql_err)?;
    let keys = stmt
        .query_map([], |row| row.get(0))
        .map_err(map_sql_err)?
        .collect::<Result<Vec<String>, _>>()
        .map_err(map_sql_err)?;
    Ok(keys)
}
