// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests driving the `keyseal` binary.
//!
//! Each test gets its own data directory and config file, so tests are
//! independent and order-insensitive. These run the production work factor.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use keyseal_core::SettingsStore;
use keyseal_storage::Database;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
    config_path: PathBuf,
}

impl Env {
    fn new() -> Self {
        Self::with_toml("")
    }

    fn with_toml(extra: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("keyseal.toml");
        let env = Self { dir, config_path };
        env.write_config(extra);
        env
    }

    /// Replace the config file, keeping the same data directory.
    fn write_config(&self, extra: &str) {
        let toml = format!(
            "[app]\ndata_dir = {:?}\nlog_level = \"warn\"\n{extra}",
            self.data_dir().display().to_string()
        );
        std::fs::write(&self.config_path, toml).unwrap();
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_keyseal"))
            .args(args)
            .arg("--config")
            .arg(&self.config_path)
            .env_remove("KEYSEAL_SECRET")
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

fn database(data_dir: &Path) -> Database {
    Database::open(data_dir.join("settings.db"), false).unwrap()
}

#[test]
fn encrypt_and_decrypt_round_trip() {
    let env = Env::new();

    let out = env.run(&["encrypt", "sk-live-abc123"]);
    assert!(out.status.success(), "{out:?}");
    let token = stdout(&out);
    assert!(token.starts_with("enc:v1:"));
    assert!(env.data_dir().join(".salt").exists());

    let out = env.run(&["decrypt", &token, "--strict"]);
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "sk-live-abc123");
}

#[test]
fn strict_decrypt_failure_exits_nonzero_with_guidance() {
    let env = Env::new();
    let bogus = "enc:v1:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

    let silent = env.run(&["decrypt", bogus]);
    assert!(silent.status.success());
    assert_eq!(stdout(&silent), "");

    let strict = env.run(&["decrypt", bogus, "--strict"]);
    assert!(!strict.status.success());
    let stderr = String::from_utf8_lossy(&strict.stderr);
    assert!(stderr.contains("re-enter your API keys"), "{stderr}");
}

#[test]
fn migrate_encrypts_legacy_rows() {
    let env = Env::new();
    std::fs::create_dir_all(env.data_dir()).unwrap();
    database(&env.data_dir())
        .set("gemini_api_key", "sk-live-abc123")
        .unwrap();

    let out = env.run(&["migrate"]);
    assert!(out.status.success(), "{out:?}");
    assert!(stdout(&out).contains("migrated  gemini_api_key"));

    let stored = database(&env.data_dir())
        .get("gemini_api_key")
        .unwrap()
        .unwrap();
    assert!(stored.starts_with("enc:v1:"));

    let out = env.run(&["get", "gemini_api_key", "--reveal", "--strict"]);
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "sk-live-abc123");
}

#[test]
fn tokens_still_decrypt_after_config_edits() {
    let env = Env::new();
    let out = env.run(&["encrypt", "sk-live-abc123"]);
    assert!(out.status.success(), "{out:?}");
    let token = stdout(&out);

    env.write_config("[vault]\nsensitive_keys = [\"openai_api_key\"]\n\n[storage]\nwal_mode = false\n");
    let out = env.run(&["decrypt", &token, "--strict"]);
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "sk-live-abc123");
}

#[test]
fn invalid_config_is_reported_before_running() {
    let env = Env::with_toml("[vault]\nsensitive_keys = []\n");
    let out = env.run(&["encrypt", "x"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(!env.data_dir().join(".salt").exists());
}

#[test]
fn doctor_runs_in_plain_mode() {
    let env = Env::new();
    let out = env.run(&["doctor", "--plain"]);
    assert!(out.status.success(), "{out:?}");
    let text = stdout(&out);
    assert!(text.contains("keyseal doctor"));
    assert!(text.contains("Salt file"));
    assert!(!env.data_dir().join(".salt").exists());
}
