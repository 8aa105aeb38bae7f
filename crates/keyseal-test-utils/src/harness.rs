// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for integration testing.
//!
//! `TestHarness` owns a temporary data directory and hands out codecs and
//! settings facades that share its salt file. Identities are fixed strings
//! so "another machine" is just another identity.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use keyseal_config::KeysealConfig;
use keyseal_core::KeysealError;
use keyseal_storage::Database;
use keyseal_vault::{FixedIdentity, SaltStore, SecretCodec, SecureSettings};
use tempfile::TempDir;

use crate::mock_store::MockSettingsStore;

/// Iteration count used by tests; orders of magnitude cheaper than production.
pub const TEST_ITERATIONS: NonZeroU32 = match NonZeroU32::new(1_000) {
    Some(n) => n,
    None => panic!("zero iterations"),
};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    identity: String,
    iterations: NonZeroU32,
    entries: Vec<(String, String)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            identity: "test-host|linux-x86_64|tester".to_string(),
            iterations: TEST_ITERATIONS,
            entries: Vec::new(),
        }
    }

    /// Set the identity the default codec derives its key from.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    /// Set the PBKDF2 iteration count.
    pub fn with_iterations(mut self, iterations: NonZeroU32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Pre-populate the mock store with a raw value (e.g. legacy plaintext).
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Build the test harness, creating the temporary data directory.
    pub fn build(self) -> Result<TestHarness, KeysealError> {
        let temp_dir = TempDir::new()
            .map_err(|e| KeysealError::storage_with("failed to create temp dir", e))?;
        let store = MockSettingsStore::with_entries(
            self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        Ok(TestHarness {
            identity: self.identity,
            iterations: self.iterations,
            store,
            temp_dir,
        })
    }
}

/// A complete test environment.
pub struct TestHarness {
    identity: String,
    iterations: NonZeroU32,
    store: MockSettingsStore,
    temp_dir: TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default options.
    pub fn new() -> Result<Self, KeysealError> {
        Self::builder().build()
    }

    /// Temporary data directory holding the salt file.
    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn salt_path(&self) -> PathBuf {
        SaltStore::new(self.data_dir()).path().to_path_buf()
    }

    pub fn store(&self) -> &MockSettingsStore {
        &self.store
    }

    /// Codec for the harness identity.
    pub fn codec(&self) -> SecretCodec<FixedIdentity> {
        self.codec_for(&self.identity)
    }

    /// Codec sharing this harness's salt but deriving from another identity,
    /// i.e. the same data directory seen from a different machine.
    pub fn codec_for(&self, identity: &str) -> SecretCodec<FixedIdentity> {
        SecretCodec::with_identity(SaltStore::new(self.data_dir()), FixedIdentity::new(identity))
            .with_iterations(self.iterations)
    }

    /// Settings facade over the mock store.
    pub fn settings(&self) -> SecureSettings<&MockSettingsStore, FixedIdentity> {
        SecureSettings::new(&self.store, self.codec())
    }

    /// Config rooted at the harness data directory. Pair it with
    /// [`codec`](Self::codec) rather than `SecretCodec::from_config`, which
    /// uses the live machine identity and production work factor.
    pub fn config(&self) -> KeysealConfig {
        let mut config = KeysealConfig::default();
        config.app.data_dir = self.data_dir().to_string_lossy().into_owned();
        config
    }

    /// Open a real SQLite settings database inside the data directory.
    pub fn open_database(&self) -> Result<Database, KeysealError> {
        Database::open(self.data_dir().join("settings.db"), true)
    }
}
