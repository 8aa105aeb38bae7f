// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `keyseal doctor` command implementation.
//!
//! Runs diagnostic checks against the local installation: configuration,
//! data directory, salt file, identity sources, settings database and the
//! state of every stored secret. Never creates the salt file.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use keyseal_config::KeysealConfig;
use keyseal_core::{KeysealError, SettingsStore};
use keyseal_storage::Database;
use keyseal_vault::{is_token, DecryptMode, IdentitySource, SaltStore, SecretCodec};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: impl Into<String>, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `keyseal doctor` command.
///
/// With `--plain`, disables colored output.
pub fn run_doctor<I: IdentitySource>(
    config: &KeysealConfig,
    codec: &SecretCodec<I>,
    config_path: Option<&Path>,
    plain: bool,
) -> Result<(), KeysealError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = collect_checks(config, codec, config_path);

    println!();
    println!("  keyseal doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;

    for result in &results {
        match result.status {
            CheckStatus::Warn => warn_count += 1,
            CheckStatus::Fail => fail_count += 1,
            CheckStatus::Pass => {}
        }
        println!("{}", render_line(result, use_color));
    }

    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }

    println!();

    Ok(())
}

/// Run every check in display order.
fn collect_checks<I: IdentitySource>(
    config: &KeysealConfig,
    codec: &SecretCodec<I>,
    config_path: Option<&Path>,
) -> Vec<CheckResult> {
    let mut results = vec![
        check_config(config_path),
        check_data_dir(&config.data_dir()),
        check_salt(codec.salt_store()),
        check_identity(codec.identity()),
        check_database(&config.database_path()),
    ];
    results.extend(check_secrets(config, codec));
    results
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    use colored::Colorize;

    let duration_ms = result.duration.as_millis();
    match (&result.status, use_color) {
        (CheckStatus::Pass, true) => format!(
            "    {} {:<20} {} ({duration_ms}ms)",
            "✓".green(),
            result.name,
            result.message
        ),
        (CheckStatus::Warn, true) => format!(
            "    {} {:<20} {} ({duration_ms}ms)",
            "!".yellow(),
            result.name,
            result.message.yellow()
        ),
        (CheckStatus::Fail, true) => format!(
            "    {} {:<20} {} ({duration_ms}ms)",
            "✗".red(),
            result.name,
            result.message.red()
        ),
        (CheckStatus::Pass, false) => format!(
            "    [OK]   {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        ),
        (CheckStatus::Warn, false) => format!(
            "    [WARN] {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        ),
        (CheckStatus::Fail, false) => format!(
            "    [FAIL] {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        ),
    }
}

/// Check configuration loads without errors.
fn check_config(config_path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let loaded = match config_path {
        Some(path) => keyseal_config::load_and_validate_path(path),
        None => keyseal_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Check the data directory exists and is a directory.
fn check_data_dir(data_dir: &Path) -> CheckResult {
    let start = Instant::now();
    match std::fs::metadata(data_dir) {
        Ok(meta) if meta.is_dir() => CheckResult::new(
            "Data directory",
            CheckStatus::Pass,
            data_dir.display().to_string(),
            start,
        ),
        Ok(_) => CheckResult::new(
            "Data directory",
            CheckStatus::Fail,
            format!("not a directory: {}", data_dir.display()),
            start,
        ),
        Err(_) => CheckResult::new(
            "Data directory",
            CheckStatus::Warn,
            format!("not found: {} (will be created on first use)", data_dir.display()),
            start,
        ),
    }
}

/// Check the salt file is present and well-formed, without creating it.
fn check_salt(salts: &SaltStore) -> CheckResult {
    let start = Instant::now();
    match salts.load() {
        Ok(Some(_)) => CheckResult::new("Salt file", CheckStatus::Pass, "present (16 bytes)", start),
        Ok(None) => CheckResult::new(
            "Salt file",
            CheckStatus::Warn,
            "not created yet (created on first encryption)",
            start,
        ),
        Err(e) => CheckResult::new("Salt file", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Report which identity components this machine provides. Values are never shown.
fn check_identity<I: IdentitySource>(identity: &I) -> CheckResult {
    let start = Instant::now();
    let available = identity.available_components();
    let listed = available.join(", ");
    if available.len() >= 2 {
        CheckResult::new("Machine identity", CheckStatus::Pass, listed, start)
    } else {
        CheckResult::new(
            "Machine identity",
            CheckStatus::Warn,
            format!("weak identity ({} component(s): {listed})", available.len()),
            start,
        )
    }
}

/// Check the settings database exists and can be opened.
fn check_database(db_path: &Path) -> CheckResult {
    let start = Instant::now();

    if !db_path.exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {} (will be created on first run)", db_path.display()),
            start,
        );
    }

    match Database::open(db_path, false).and_then(|db| db.ping()) {
        Ok(()) => CheckResult::new("Database", CheckStatus::Pass, "connected", start),
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Check every sensitive key decrypts on this machine (strict mode).
fn check_secrets<I: IdentitySource>(config: &KeysealConfig, codec: &SecretCodec<I>) -> Vec<CheckResult> {
    let db_path = config.database_path();
    if !db_path.exists() {
        return Vec::new();
    }
    let db = match Database::open(&db_path, false) {
        Ok(db) => db,
        Err(_) => return Vec::new(),
    };
    let salt_present = matches!(codec.salt_store().load(), Ok(Some(_)));

    config
        .vault
        .sensitive_keys
        .iter()
        .map(|key| check_secret(&db, codec, key, salt_present))
        .collect()
}

fn check_secret<S: SettingsStore, I: IdentitySource>(
    store: &S,
    codec: &SecretCodec<I>,
    key: &str,
    salt_present: bool,
) -> CheckResult {
    let start = Instant::now();
    let value = match store.get(key) {
        Ok(Some(value)) if !value.is_empty() => value,
        Ok(_) => return CheckResult::new(key, CheckStatus::Pass, "not set", start),
        Err(e) => return CheckResult::new(key, CheckStatus::Fail, e.to_string(), start),
    };

    if !is_token(&value) {
        return CheckResult::new(
            key,
            CheckStatus::Warn,
            "stored as plaintext -- run `keyseal migrate`",
            start,
        );
    }
    if !salt_present {
        return CheckResult::new(
            key,
            CheckStatus::Fail,
            "encrypted but the salt file is missing -- re-enter this key",
            start,
        );
    }

    match codec.decrypt(&value, DecryptMode::Strict) {
        Ok(_) => CheckResult::new(key, CheckStatus::Pass, "encrypted, decrypts on this machine", start),
        Err(e) if e.is_decryption() => CheckResult::new(
            key,
            CheckStatus::Fail,
            "cannot be decrypted on this machine -- re-enter this key",
            start,
        ),
        Err(e) => CheckResult::new(key, CheckStatus::Fail, e.to_string(), start),
    }
}
