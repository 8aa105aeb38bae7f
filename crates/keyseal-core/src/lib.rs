// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for keyseal.
//!
//! Provides the shared error type, the settings store contract consumed by
//! the vault layer, and the typed application settings record.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{KeysealError, DECRYPTION_HELP};
pub use traits::SettingsStore;
pub use types::{AppSettings, SettingKey, SENSITIVE_KEYS};
