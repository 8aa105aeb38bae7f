// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret codec: plaintext strings in, versioned tokens out, and back.
//!
//! The key is derived from the machine identity and the installation salt on
//! every call and dropped (zeroed) when the call returns. Decryption goes
//! through a single [`SecretCodec::open`] whose outcome each caller maps with
//! a [`DecryptMode`]: settings loads stay silent so the application degrades
//! to "credential not configured", while migration and diagnostics use
//! strict mode to surface failures.

use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;

use keyseal_config::KeysealConfig;
use keyseal_core::KeysealError;
use thiserror::Error;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto;
use crate::identity::{derive_identity, IdentitySource, SystemIdentity};
use crate::kdf::{self, KEY_LEN};
use crate::salt::SaltStore;
use crate::token::{self, TokenVersion};

/// Why a token could not be turned back into plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("unsupported token version `{0}`")]
    UnsupportedVersion(String),

    #[error("token payload is not valid base64")]
    InvalidEncoding,

    #[error("token payload is too short ({len} bytes)")]
    Truncated { len: usize },

    #[error("authentication failed (wrong key or tampered data)")]
    Unauthenticated,

    #[error("decrypted secret is not valid UTF-8")]
    InvalidUtf8,
}

impl From<RejectReason> for KeysealError {
    fn from(reason: RejectReason) -> Self {
        KeysealError::Decryption {
            reason: reason.to_string(),
        }
    }
}

/// How a caller wants decryption failures reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecryptMode {
    /// Failures become the empty string ("no secret configured").
    #[default]
    Silent,
    /// Failures become [`KeysealError::Decryption`].
    Strict,
}

/// Outcome of opening a stored value.
#[derive(PartialEq, Eq)]
pub enum Opened {
    /// The stored value was empty.
    Empty,
    /// The stored value was not a token (legacy plaintext); returned as-is.
    Passthrough(String),
    /// The token decrypted successfully.
    Decrypted(String),
    /// The value looked like a token but could not be decrypted.
    Rejected(RejectReason),
}

impl Opened {
    /// Map the outcome to a plain value according to `mode`.
    pub fn into_value(self, mode: DecryptMode) -> Result<String, KeysealError> {
        match self {
            Opened::Empty => Ok(String::new()),
            Opened::Passthrough(value) | Opened::Decrypted(value) => Ok(value),
            Opened::Rejected(reason) => match mode {
                DecryptMode::Silent => {
                    warn!(%reason, "stored secret could not be decrypted -- treating as not configured");
                    Ok(String::new())
                }
                DecryptMode::Strict => Err(reason.into()),
            },
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Opened::Rejected(_))
    }
}

impl fmt::Debug for Opened {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opened::Empty => f.write_str("Empty"),
            Opened::Passthrough(_) => f.write_str("Passthrough([REDACTED])"),
            Opened::Decrypted(_) => f.write_str("Decrypted([REDACTED])"),
            Opened::Rejected(reason) => f.debug_tuple("Rejected").field(reason).finish(),
        }
    }
}

/// Encrypts and decrypts secrets with a key bound to this machine.
///
/// The PBKDF2 work factor comes from the token version, so a token decrypts
/// under any configuration that shares its data directory.
#[derive(Debug, Clone)]
pub struct SecretCodec<I = SystemIdentity> {
    salts: SaltStore,
    identity: I,
    iterations_override: Option<NonZeroU32>,
}

impl SecretCodec<SystemIdentity> {
    /// Codec for the live machine identity, with the salt under `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::with_identity(SaltStore::new(data_dir), SystemIdentity)
    }

    /// Codec for the live machine identity using the configured data
    /// directory.
    pub fn from_config(config: &KeysealConfig) -> Self {
        Self::new(config.data_dir())
    }
}

impl<I: IdentitySource> SecretCodec<I> {
    pub fn with_identity(salts: SaltStore, identity: I) -> Self {
        Self {
            salts,
            identity,
            iterations_override: None,
        }
    }

    /// Replace the per-version work factor with `iterations` for every
    /// version. Meant for tests; tokens produced this way only decrypt under
    /// the same override.
    pub fn with_iterations(mut self, iterations: NonZeroU32) -> Self {
        self.iterations_override = Some(iterations);
        self
    }

    pub fn salt_store(&self) -> &SaltStore {
        &self.salts
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Encrypt `plaintext` into a token.
    ///
    /// Empty input stays empty and an existing token is returned unchanged,
    /// so saving settings repeatedly never double-encrypts. The only failures
    /// are salt storage errors (and CSPRNG failure).
    pub fn encrypt(&self, plaintext: &str) -> Result<String, KeysealError> {
        if plaintext.is_empty() || token::is_token(plaintext) {
            return Ok(plaintext.to_string());
        }

        let version = TokenVersion::CURRENT;
        let key = self.derive_key(version)?;
        let sealed = crypto::seal(&key, version.header().as_bytes(), plaintext.as_bytes())?;
        Ok(token::format(version, &sealed))
    }

    /// Open a stored value without deciding how failures are reported.
    ///
    /// Returns `Err` only for salt storage problems; every token problem is
    /// an [`Opened::Rejected`].
    pub fn open(&self, value: &str) -> Result<Opened, KeysealError> {
        if value.is_empty() {
            return Ok(Opened::Empty);
        }
        let Some(parsed) = token::parse(value) else {
            return Ok(Opened::Passthrough(value.to_string()));
        };

        let decoded = parsed
            .version()
            .and_then(|version| Ok((version, parsed.decode_payload()?)));
        let (version, sealed) = match decoded {
            Ok(decoded) => decoded,
            Err(reason) => return Ok(self.reject(reason)),
        };

        let key = self.derive_key(version)?;
        let plaintext = match crypto::open(&key, version.header().as_bytes(), &sealed) {
            Ok(bytes) => bytes,
            Err(reason) => return Ok(self.reject(reason)),
        };

        match std::str::from_utf8(&plaintext) {
            Ok(text) => Ok(Opened::Decrypted(text.to_string())),
            Err(_) => Ok(self.reject(RejectReason::InvalidUtf8)),
        }
    }

    /// Decrypt a stored value, reporting failures according to `mode`.
    ///
    /// Empty input yields empty output and non-token input is returned
    /// unchanged (legacy plaintext).
    pub fn decrypt(&self, value: &str, mode: DecryptMode) -> Result<String, KeysealError> {
        self.open(value)?.into_value(mode)
    }

    fn reject(&self, reason: RejectReason) -> Opened {
        debug!(%reason, "secret token rejected");
        Opened::Rejected(reason)
    }

    fn derive_key(&self, version: TokenVersion) -> Result<Zeroizing<[u8; KEY_LEN]>, KeysealError> {
        let iterations = self.iterations_override.unwrap_or(version.iterations());
        let salt = self.salts.get_or_create()?;
        let identity = Zeroizing::new(derive_identity(&self.identity));
        Ok(kdf::derive_key(identity.as_bytes(), &salt, iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FixedIdentity;
    use tempfile::{tempdir, TempDir};

    fn codec_for(dir: &TempDir, identity: &str) -> SecretCodec<FixedIdentity> {
        SecretCodec::with_identity(SaltStore::new(dir.path()), FixedIdentity::new(identity))
            .with_iterations(NonZeroU32::new(1_000).unwrap())
    }

    #[test]
    fn roundtrip_recovers_plaintext() {
        let dir = tempdir().unwrap();
        let codec = codec_for(&dir, "machine-a");

        let token = codec.encrypt("sk-live-abc123").unwrap();
        assert!(token.starts_with("enc:v1:"));
        assert_ne!(token, "sk-live-abc123");
        assert_eq!(
            codec.decrypt(&token, DecryptMode::Silent).unwrap(),
            "sk-live-abc123"
        );
        assert_eq!(
            codec.decrypt(&token, DecryptMode::Strict).unwrap(),
            "sk-live-abc123"
        );
    }

    #[test]
    fn encrypt_is_idempotent_on_tokens() {
        let dir = tempdir().unwrap();
        let codec = codec_for(&dir, "machine-a");

        let once = codec.encrypt("sk-live-abc123").unwrap();
        let twice = codec.encrypt(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn same_plaintext_encrypts_to_different_tokens() {
        let dir = tempdir().unwrap();
        let codec = codec_for(&dir, "machine-a");
        assert_ne!(
            codec.encrypt("same").unwrap(),
            codec.encrypt("same").unwrap()
        );
    }

    #[test]
    fn empty_values_stay_empty_without_touching_salt() {
        let dir = tempdir().unwrap();
        let codec = codec_for(&dir, "machine-a");

        assert_eq!(codec.encrypt("").unwrap(), "");
        assert_eq!(codec.decrypt("", DecryptMode::Strict).unwrap(), "");
        assert_eq!(codec.open("").unwrap(), Opened::Empty);
        assert!(!codec.salt_store().path().exists());
    }

    #[test]
    fn legacy_plaintext_passes_through() {
        let dir = tempdir().unwrap();
        let codec = codec_for(&dir, "machine-a");

        assert_eq!(
            codec.open("sk-legacy").unwrap(),
            Opened::Passthrough("sk-legacy".to_string())
        );
        assert_eq!(
            codec.decrypt("sk-legacy", DecryptMode::Strict).unwrap(),
            "sk-legacy"
        );
    }

    #[test]
    fn changed_identity_is_silent_empty_or_strict_error() {
        let dir = tempdir().unwrap();
        let token = codec_for(&dir, "machine-a").encrypt("sk-live-abc123").unwrap();
        let other = codec_for(&dir, "machine-b");

        assert_eq!(
            other.open(&token).unwrap(),
            Opened::Rejected(RejectReason::Unauthenticated)
        );
        assert_eq!(other.decrypt(&token, DecryptMode::Silent).unwrap(), "");

        let err = other.decrypt(&token, DecryptMode::Strict).unwrap_err();
        assert!(err.is_decryption(), "got {err:?}");
        assert!(err.to_string().contains("re-enter your API keys"));
    }

    #[test]
    fn different_work_factor_cannot_decrypt() {
        let dir = tempdir().unwrap();
        let token = codec_for(&dir, "machine-a").encrypt("secret").unwrap();
        let slower = codec_for(&dir, "machine-a").with_iterations(NonZeroU32::new(1_001).unwrap());
        assert!(slower.open(&token).unwrap().is_rejected());
    }

    #[test]
    fn config_changes_do_not_invalidate_tokens() {
        let dir = tempdir().unwrap();
        let mut first = KeysealConfig::default();
        first.app.data_dir = dir.path().to_string_lossy().into_owned();
        let mut second = first.clone();
        second.app.log_level = "debug".to_string();
        second.vault.sensitive_keys = vec!["openai_api_key".to_string()];
        second.storage.wal_mode = false;

        let token = SecretCodec::from_config(&first).encrypt("sk-live-abc123").unwrap();
        assert_eq!(
            SecretCodec::from_config(&second)
                .decrypt(&token, DecryptMode::Strict)
                .unwrap(),
            "sk-live-abc123"
        );
    }

    #[test]
    fn malformed_tokens_are_rejected_not_errors() {
        let dir = tempdir().unwrap();
        let codec = codec_for(&dir, "machine-a");

        let cases = [
            ("enc:v1:", RejectReason::Truncated { len: 0 }),
            ("enc:v1:%%%", RejectReason::InvalidEncoding),
            ("enc:v9:AAAA", RejectReason::UnsupportedVersion("v9".into())),
        ];
        for (value, expected) in cases {
            assert_eq!(codec.open(value).unwrap(), Opened::Rejected(expected));
            assert_eq!(codec.decrypt(value, DecryptMode::Silent).unwrap(), "");
            assert!(codec.decrypt(value, DecryptMode::Strict).unwrap_err().is_decryption());
        }
    }

    #[test]
    fn unsupported_versions_are_not_reencrypted() {
        let dir = tempdir().unwrap();
        let codec = codec_for(&dir, "machine-a");
        assert_eq!(codec.encrypt("enc:v2:AAAA").unwrap(), "enc:v2:AAAA");
    }

    #[test]
    fn corrupt_salt_propagates_storage_error_in_both_modes() {
        let dir = tempdir().unwrap();
        let codec = codec_for(&dir, "machine-a");
        let token = codec.encrypt("secret").unwrap();
        std::fs::write(codec.salt_store().path(), [0u8; 4]).unwrap();

        assert!(codec.encrypt("other").unwrap_err().is_storage());
        assert!(codec.decrypt(&token, DecryptMode::Silent).unwrap_err().is_storage());
        assert!(codec.decrypt(&token, DecryptMode::Strict).unwrap_err().is_storage());
    }

    #[test]
    fn opened_debug_redacts_secrets() {
        let rendered = format!("{:?}", Opened::Decrypted("sk-live-abc123".into()));
        assert!(!rendered.contains("sk-live"));
    }

    #[test]
    fn decrypt_mode_defaults_to_silent() {
        assert_eq!(DecryptMode::default(), DecryptMode::Silent);
    }
}
