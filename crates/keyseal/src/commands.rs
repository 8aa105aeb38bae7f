// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret and settings subcommands.
//!
//! Each command writes its result to `out` so it can be tested without
//! capturing stdout. Diagnostics go through tracing (stderr).

use std::io::Write;

use keyseal_config::KeysealConfig;
use keyseal_core::{KeysealError, SettingsStore};
use keyseal_storage::Database;
use keyseal_vault::{
    mask_secret, read_secret, DecryptMode, IdentitySource, SecretCodec, SecureSettings,
};
use secrecy::ExposeSecret;

/// `keyseal encrypt [VALUE]`
pub fn encrypt<I: IdentitySource>(
    codec: &SecretCodec<I>,
    value: Option<String>,
    out: &mut impl Write,
) -> Result<(), KeysealError> {
    let token = match value {
        Some(value) => codec.encrypt(&value)?,
        None => codec.encrypt(read_secret("Value to encrypt")?.expose_secret())?,
    };
    emit(out, &token)
}

/// `keyseal decrypt TOKEN [--strict]`
pub fn decrypt<I: IdentitySource>(
    codec: &SecretCodec<I>,
    token: &str,
    strict: bool,
    out: &mut impl Write,
) -> Result<(), KeysealError> {
    let plaintext = codec.decrypt(token, mode(strict))?;
    emit(out, &plaintext)
}

/// `keyseal get KEY [--strict] [--reveal]`
pub fn get<S: SettingsStore, I: IdentitySource>(
    settings: &SecureSettings<S, I>,
    key: &str,
    strict: bool,
    reveal: bool,
    out: &mut impl Write,
) -> Result<(), KeysealError> {
    match settings.get(key, mode(strict))? {
        Some(value) if settings.is_sensitive(key) && !reveal => emit(out, &mask_secret(&value)),
        Some(value) => emit(out, &value),
        None => {
            tracing::warn!(key, "setting is not set");
            Ok(())
        }
    }
}

/// `keyseal set KEY [VALUE]`
pub fn set<S: SettingsStore, I: IdentitySource>(
    settings: &SecureSettings<S, I>,
    key: &str,
    value: Option<String>,
    out: &mut impl Write,
) -> Result<(), KeysealError> {
    match value {
        Some(value) => settings.set(key, &value)?,
        None => settings.set(key, read_secret(&format!("Value for {key}"))?.expose_secret())?,
    }
    let note = if settings.is_sensitive(key) {
        " (encrypted)"
    } else {
        ""
    };
    emit(out, &format!("{key} saved{note}"))
}

/// `keyseal migrate`
pub fn migrate<S: SettingsStore, I: IdentitySource>(
    settings: &SecureSettings<S, I>,
    out: &mut impl Write,
) -> Result<(), KeysealError> {
    let report = settings.migrate()?;

    if !report.changed() {
        emit(out, "no plaintext secrets found -- nothing to migrate")?;
    }
    for key in &report.migrated {
        emit(out, &format!("migrated  {key}"))?;
    }
    for key in &report.skipped {
        emit(out, &format!("encrypted {key}"))?;
    }
    for key in &report.absent {
        emit(out, &format!("not set   {key}"))?;
    }
    Ok(())
}

/// Settings facade over the configured database and sensitive keys.
pub fn open_settings<I: IdentitySource>(
    config: &KeysealConfig,
    codec: SecretCodec<I>,
) -> Result<SecureSettings<Database, I>, KeysealError> {
    let db = Database::open_with_config(config)?;
    Ok(SecureSettings::new(db, codec).with_sensitive_keys(config.vault.sensitive_keys.iter().cloned()))
}

fn mode(strict: bool) -> DecryptMode {
    if strict {
        DecryptMode::Strict
    } else {
        DecryptMode::Silent
    }
}

fn emit(out: &mut impl Write, line: &str) -> Result<(), KeysealError> {
    writeln!(out, "{line}").map_err(|e| KeysealError::Internal(format!("failed to write output: {e}")))
}
