// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory settings store for deterministic testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use keyseal_core::{KeysealError, SettingsStore};

/// A `SettingsStore` backed by a map.
///
/// Counts writes so tests can assert that an operation was a no-op, and can
/// be switched into a failing mode to exercise storage error paths.
#[derive(Debug, Default)]
pub struct MockSettingsStore {
    values: Mutex<BTreeMap<String, String>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl MockSettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with raw values (written as-is, not counted).
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        {
            let mut values = store.lock();
            for (key, value) in entries {
                values.insert(key.to_string(), value.to_string());
            }
        }
        store
    }

    /// Raw stored value, bypassing failure injection.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent `get`/`set` fail with a storage error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), KeysealError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(KeysealError::storage("mock store failure"));
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SettingsStore for MockSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeysealError> {
        self.check()?;
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KeysealError> {
        self.check()?;
        self.lock().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_writes_but_not_seed_entries() {
        let store = MockSettingsStore::with_entries([("language", "en")]);
        assert_eq!(store.write_count(), 0);
        store.set("language", "de").unwrap();
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.raw("language").as_deref(), Some("de"));
    }

    #[test]
    fn failing_mode_returns_storage_errors() {
        let store = MockSettingsStore::new();
        store.set_failing(true);
        assert!(store.get("x").unwrap_err().is_storage());
        assert!(store.set("x", "y").unwrap_err().is_storage());
        store.set_failing(false);
        assert_eq!(store.get("x").unwrap(), None);
    }
}
