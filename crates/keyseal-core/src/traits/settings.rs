// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings store contract.

use crate::error::KeysealError;

/// A string-to-string settings mapping owned by some external store.
///
/// Implementations own their persistence; callers hold no long-lived handle
/// beyond the store reference itself. Failures surface as
/// [`KeysealError::Storage`].
pub trait SettingsStore {
    /// Returns the stored value, or `None` if the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>, KeysealError>;

    /// Inserts or replaces the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), KeysealError>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, KeysealError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeysealError> {
        (**self).set(key, value)
    }
}
