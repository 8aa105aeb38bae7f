// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings persistence with transparent credential encryption.
//!
//! [`SecureSettings`] sits between the application and its [`SettingsStore`].
//! Sensitive keys go through the [`SecretCodec`] on the way in and out; every
//! other key is passed through untouched.

use keyseal_core::{AppSettings, KeysealError, SettingKey, SettingsStore, SENSITIVE_KEYS};
use tracing::debug;

use crate::codec::{DecryptMode, SecretCodec};
use crate::identity::{IdentitySource, SystemIdentity};
use crate::migration::{migrate_plaintext_secrets, MigrationReport};

/// Settings store wrapper that keeps credentials encrypted at rest.
#[derive(Debug)]
pub struct SecureSettings<S, I = SystemIdentity> {
    store: S,
    codec: SecretCodec<I>,
    sensitive_keys: Vec<String>,
}

impl<S: SettingsStore, I: IdentitySource> SecureSettings<S, I> {
    /// Wrap `store`, treating the default credential keys as sensitive.
    pub fn new(store: S, codec: SecretCodec<I>) -> Self {
        Self {
            store,
            codec,
            sensitive_keys: SENSITIVE_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Replace the set of keys that are encrypted at rest.
    pub fn with_sensitive_keys<K: Into<String>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.sensitive_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn sensitive_keys(&self) -> &[String] {
        &self.sensitive_keys
    }

    pub fn is_sensitive(&self, key: &str) -> bool {
        self.sensitive_keys.iter().any(|k| k == key)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &SecretCodec<I> {
        &self.codec
    }

    /// Persist every field of `settings`, encrypting sensitive ones.
    ///
    /// Saving the same settings twice does not double-encrypt.
    pub fn save(&self, settings: &AppSettings) -> Result<(), KeysealError> {
        for key in SettingKey::all() {
            self.set(key.as_ref(), settings.get(key))?;
        }
        debug!("settings saved");
        Ok(())
    }

    /// Read every known field. Unset fields keep their defaults and
    /// undecryptable credentials come back empty.
    pub fn load(&self) -> Result<AppSettings, KeysealError> {
        let mut settings = AppSettings::default();
        for key in SettingKey::all() {
            if let Some(value) = self.get(key.as_ref(), DecryptMode::Silent)? {
                settings.set(key, value);
            }
        }
        Ok(settings)
    }

    /// Read a single key, decrypting it if it is sensitive.
    pub fn get(&self, key: &str, mode: DecryptMode) -> Result<Option<String>, KeysealError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        if !self.is_sensitive(key) {
            return Ok(Some(raw));
        }
        self.codec.decrypt(&raw, mode).map(Some)
    }

    /// Write a single key, encrypting it if it is sensitive.
    pub fn set(&self, key: &str, value: &str) -> Result<(), KeysealError> {
        if self.is_sensitive(key) {
            let token = self.codec.encrypt(value)?;
            self.store.set(key, &token)
        } else {
            self.store.set(key, value)
        }
    }

    /// Encrypt any plaintext credentials left by earlier versions.
    pub fn migrate(&self) -> Result<MigrationReport, KeysealError> {
        migrate_plaintext_secrets(&self.store, &self.codec, self.sensitive_keys.as_slice())
    }
}

/// Mask a secret for display: first and last four characters for values of
/// ten characters or more, `****` otherwise.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
