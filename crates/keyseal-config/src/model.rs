// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for keyseal.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level keyseal configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeysealConfig {
    /// Logging and data directory settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Key derivation and sensitive key settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Settings database settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl KeysealConfig {
    /// Directory holding the salt file and, by default, the settings database.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.app.data_dir)
    }

    /// Resolved settings database path.
    ///
    /// Falls back to `<data_dir>/settings.db` when `storage.database_path` is unset.
    pub fn database_path(&self) -> PathBuf {
        match &self.storage.database_path {
            Some(path) => PathBuf::from(path),
            None => self.data_dir().join("settings.db"),
        }
    }
}

/// Application-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Log level filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Local data directory for the salt file and settings database.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("keyseal"))
        .unwrap_or_else(|| PathBuf::from(".keyseal"))
        .display()
        .to_string()
}

/// Secret encryption settings.
///
/// The key derivation work factor is not configurable: it is fixed by the
/// token version so that stored tokens stay decryptable across config edits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Settings keys whose values are encrypted at rest.
    #[serde(default = "default_sensitive_keys")]
    pub sensitive_keys: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            sensitive_keys: default_sensitive_keys(),
        }
    }
}

fn default_sensitive_keys() -> Vec<String> {
    vec!["claude_api_key".to_string(), "gemini_api_key".to_string()]
}

/// Settings database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite settings database. Defaults to `<data_dir>/settings.db`.
    #[serde(default)]
    pub database_path: Option<String>,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_wal_mode() -> bool {
    true
}
