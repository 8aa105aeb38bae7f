// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for keyseal.

use thiserror::Error;

/// Message shown to users when a stored secret can no longer be decrypted.
pub const DECRYPTION_HELP: &str = "failed to decrypt stored secret -- the machine identity changed \
     or the data is corrupted; re-enter your API keys in settings";

/// The primary error type shared by every keyseal crate.
#[derive(Debug, Error)]
pub enum KeysealError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Salt file or settings store failures (missing and uncreatable,
    /// unreadable, wrong length, database errors).
    #[error("storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authenticated decryption failed, or the token was malformed.
    ///
    /// `reason` is diagnostic detail for logs; the display text stays
    /// user-actionable.
    #[error("{}", DECRYPTION_HELP)]
    Decryption { reason: String },

    /// Internal or unexpected errors (CSPRNG or cipher setup failure).
    #[error("internal error: {0}")]
    Internal(String),
}

impl KeysealError {
    /// Storage error without an underlying cause.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Storage error wrapping an underlying cause.
    pub fn storage_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true for salt/settings store failures.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }

    /// Returns true for decryption failures.
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption { .. })
    }
}
