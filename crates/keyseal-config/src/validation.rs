// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as known log levels and non-empty paths.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::KeysealConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &KeysealConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.app.log_level
            ),
        });
    }

    if config.app.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "app.data_dir must not be empty".to_string(),
        });
    }

    if let Some(path) = &config.storage.database_path {
        if path.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "storage.database_path must not be empty when set".to_string(),
            });
        }
    }

    if config.vault.sensitive_keys.is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.sensitive_keys must list at least one key".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for key in &config.vault.sensitive_keys {
        if key.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "vault.sensitive_keys must not contain empty names".to_string(),
            });
        } else if !seen.insert(key.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("vault.sensitive_keys lists `{key}` more than once"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&KeysealConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = KeysealConfig::default();
        config.app.log_level = "loud".to_string();
        config.vault.sensitive_keys = vec!["a".into(), "a".into(), " ".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
