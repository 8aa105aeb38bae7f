// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application settings shared by the storage and vault layers.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Settings keys that hold provider credentials and must never be stored in
/// plaintext.
pub const SENSITIVE_KEYS: [&str; 2] = ["claude_api_key", "gemini_api_key"];

/// Every key the application persists in its settings store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum SettingKey {
    ClaudeApiKey,
    GeminiApiKey,
    DefaultModel,
    Language,
}

impl SettingKey {
    /// All known keys, in persistence order.
    pub fn all() -> impl Iterator<Item = SettingKey> {
        SettingKey::iter()
    }
}

/// Typed view of the application's settings.
///
/// Credential fields hold plaintext here; encryption happens on the way into
/// the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub claude_api_key: String,
    pub gemini_api_key: String,
    pub default_model: String,
    pub language: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            claude_api_key: String::new(),
            gemini_api_key: String::new(),
            default_model: "gemini".to_string(),
            language: "en".to_string(),
        }
    }
}

impl AppSettings {
    pub fn get(&self, key: SettingKey) -> &str {
        match key {
            SettingKey::ClaudeApiKey => &self.claude_api_key,
            SettingKey::GeminiApiKey => &self.gemini_api_key,
            SettingKey::DefaultModel => &self.default_model,
            SettingKey::Language => &self.language,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: String) {
        match key {
            SettingKey::ClaudeApiKey => self.claude_api_key = value,
            SettingKey::GeminiApiKey => self.gemini_api_key = value,
            SettingKey::DefaultModel => self.default_model = value,
            SettingKey::Language => self.language = value,
        }
    }
}
