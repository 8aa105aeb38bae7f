// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./keyseal.toml` > `~/.config/keyseal/keyseal.toml` > `/etc/keyseal/keyseal.toml`
//! with environment variable overrides via `KEYSEAL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::KeysealConfig;

/// Config sections that environment variables may target.
const ENV_SECTIONS: [&str; 3] = ["app", "vault", "storage"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/keyseal/keyseal.toml` (system-wide)
/// 3. `~/.config/keyseal/keyseal.toml` (user XDG config)
/// 4. `./keyseal.toml` (local directory)
/// 5. `KEYSEAL_*` environment variables
pub fn load_config() -> Result<KeysealConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<KeysealConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeysealConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KeysealConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeysealConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KeysealConfig::default()))
        .merge(Toml::file("/etc/keyseal/keyseal.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("keyseal/keyseal.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("keyseal.toml"))
        .merge(env_provider())
}

/// Map `KEYSEAL_<SECTION>_<FIELD>` to `section.field`.
///
/// Uses an explicit section split rather than `Env::split("_")` because field
/// names contain underscores (`KEYSEAL_STORAGE_DATABASE_PATH` is
/// `storage.database_path`). Variables outside the known sections, such as
/// `KEYSEAL_SECRET`, are ignored.
fn env_provider() -> Env {
    Env::prefixed("KEYSEAL_")
        .filter(|key| {
            ENV_SECTIONS
                .iter()
                .any(|section| key.starts_with(&format!("{section}_")))
        })
        .map(|key| {
            let key_str = key.as_str().to_ascii_lowercase();
            let mapped = ENV_SECTIONS
                .iter()
                .find_map(|section| {
                    key_str
                        .strip_prefix(&format!("{section}_"))
                        .map(|field| format!("{section}.{field}"))
                })
                .unwrap_or(key_str);
            mapped.into()
        })
}
