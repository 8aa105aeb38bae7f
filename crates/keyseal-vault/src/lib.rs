// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Machine-bound encryption for locally stored API keys.
//!
//! Secrets are sealed with AES-256-GCM under a key derived (PBKDF2-HMAC-SHA256)
//! from the machine identity and a per-install random salt, then stored as
//! self-describing `enc:v1:` tokens. Nothing secret is ever written to disk
//! besides the salt, so copying the settings file to another machine yields
//! nothing usable.

pub mod codec;
pub mod crypto;
pub mod identity;
pub mod kdf;
pub mod migration;
pub mod platform;
pub mod prompt;
pub mod salt;
pub mod settings;
pub mod token;

pub use codec::{DecryptMode, Opened, RejectReason, SecretCodec};
pub use identity::{derive_identity, FixedIdentity, IdentitySource, SystemIdentity};
pub use migration::{migrate_plaintext_secrets, MigrationReport};
pub use prompt::{read_secret, SECRET_ENV_VAR};
pub use salt::{Salt, SaltStore};
pub use settings::{mask_secret, SecureSettings};
pub use token::is_token;
