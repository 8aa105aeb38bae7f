// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup migration of plaintext secrets into secret tokens.
//!
//! Earlier installs stored API keys as plain strings. This pass rewrites every
//! such value as a token and leaves tokens alone, so it is safe to run on
//! every start. It never decrypts: a value is classified purely by its shape.

use keyseal_core::{KeysealError, SettingsStore};
use tracing::{debug, info};

use crate::codec::SecretCodec;
use crate::identity::IdentitySource;
use crate::token::is_token;

/// What a migration pass did, by key name. Never carries values.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Keys whose plaintext value was encrypted and written back.
    pub migrated: Vec<String>,
    /// Keys that already held a token.
    pub skipped: Vec<String>,
    /// Keys that were unset or empty.
    pub absent: Vec<String>,
}

impl MigrationReport {
    /// Whether this pass rewrote anything.
    pub fn changed(&self) -> bool {
        !self.migrated.is_empty()
    }
}

/// Encrypt any plaintext value stored under `keys`.
///
/// Store failures and salt failures propagate; nothing is written for a key
/// whose encryption failed.
pub fn migrate_plaintext_secrets<S, I, K>(
    store: &S,
    codec: &SecretCodec<I>,
    keys: &[K],
) -> Result<MigrationReport, KeysealError>
where
    S: SettingsStore + ?Sized,
    I: IdentitySource,
    K: AsRef<str>,
{
    let mut report = MigrationReport::default();

    for key in keys {
        let key = key.as_ref();
        match store.get(key)? {
            None => report.absent.push(key.to_string()),
            Some(value) if value.is_empty() => report.absent.push(key.to_string()),
            Some(value) if is_token(&value) => {
                debug!(key, "secret already encrypted -- skipping");
                report.skipped.push(key.to_string());
            }
            Some(value) => {
                let token = codec.encrypt(&value)?;
                store.set(key, &token)?;
                info!(key, "migrated plaintext secret to encrypted token");
                report.migrated.push(key.to_string());
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    use crate::codec::DecryptMode;
    use crate::identity::FixedIdentity;
    use crate::salt::SaltStore;
    use keyseal_test_utils::MockSettingsStore;
    use tempfile::{tempdir, TempDir};
    use tracing_test::traced_test;

    const KEYS: [&str; 2] = ["claude_api_key", "gemini_api_key"];

    fn codec(dir: &TempDir) -> SecretCodec<FixedIdentity> {
        SecretCodec::with_identity(SaltStore::new(dir.path()), FixedIdentity::new("machine-a"))
            .with_iterations(NonZeroU32::new(1_000).unwrap())
    }

    #[test]
    fn encrypts_plaintext_and_leaves_absent_keys() {
        let dir = tempdir().unwrap();
        let codec = codec(&dir);
        let store = MockSettingsStore::with_entries([("gemini_api_key", "sk-live-abc123"), ("language", "en")]);

        let report = migrate_plaintext_secrets(&store, &codec, &KEYS[..]).unwrap();

        assert_eq!(report.migrated, vec!["gemini_api_key"]);
        assert_eq!(report.absent, vec!["claude_api_key"]);
        assert!(report.skipped.is_empty());

        let stored = store.raw("gemini_api_key").unwrap();
        assert!(is_token(&stored));
        assert_eq!(
            codec.decrypt(&stored, DecryptMode::Strict).unwrap(),
            "sk-live-abc123"
        );
        assert_eq!(store.raw("language").as_deref(), Some("en"));
        assert_eq!(store.raw("claude_api_key"), None);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let dir = tempdir().unwrap();
        let codec = codec(&dir);
        let store = MockSettingsStore::with_entries([("claude_api_key", "sk-ant-1"), ("gemini_api_key", "")]);

        migrate_plaintext_secrets(&store, &codec, &KEYS[..]).unwrap();
        let after_first = store.raw("claude_api_key");
        let writes = store.write_count();

        let report = migrate_plaintext_secrets(&store, &codec, &KEYS[..]).unwrap();
        assert!(!report.changed());
        assert_eq!(report.skipped, vec!["claude_api_key"]);
        assert_eq!(report.absent, vec!["gemini_api_key"]);
        assert_eq!(store.raw("claude_api_key"), after_first);
        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn never_decrypts_foreign_tokens() {
        let dir = tempdir().unwrap();
        let codec = codec(&dir);
        // Undecryptable here, but token-shaped: must be left untouched.
        let store = MockSettingsStore::with_entries([
            ("claude_api_key", "enc:v1:AAAA"),
            ("gemini_api_key", "enc:v7:zz"),
        ]);

        let report = migrate_plaintext_secrets(&store, &codec, &KEYS[..]).unwrap();
        assert_eq!(report.skipped, vec!["claude_api_key", "gemini_api_key"]);
        assert_eq!(store.write_count(), 0);
        assert!(!codec.salt_store().path().exists());
    }

    #[test]
    fn store_failure_propagates() {
        let dir = tempdir().unwrap();
        let store = MockSettingsStore::with_entries([("claude_api_key", "sk-ant-1")]);
        store.set_failing(true);

        let err = migrate_plaintext_secrets(&store, &codec(&dir), &KEYS[..]).unwrap_err();
        assert!(err.is_storage());
        store.set_failing(false);
        assert_eq!(store.raw("claude_api_key").as_deref(), Some("sk-ant-1"));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    #[traced_test]
    fn logs_key_names_but_not_values() {
        let dir = tempdir().unwrap();
        let store = MockSettingsStore::with_entries([("gemini_api_key", "sk-live-abc123")]);

        migrate_plaintext_secrets(&store, &codec(&dir), &KEYS[..]).unwrap();

        assert!(logs_contain("migrated plaintext secret"));
        assert!(logs_contain("gemini_api_key"));
        assert!(!logs_contain("sk-live-abc123"));
    }
}
