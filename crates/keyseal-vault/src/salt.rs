// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Salt lifecycle: created once per installation, read thereafter.
//!
//! The salt lives in its own file (`<data_dir>/.salt`, exactly 16 raw bytes)
//! away from any ciphertext. This module never rewrites an existing salt file:
//! replacing it makes every previously issued token undecryptable, so that
//! operation is intentionally unsupported.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use keyseal_core::KeysealError;
use ring::rand::{SecureRandom, SystemRandom};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::platform;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// File name of the salt inside the data directory.
pub const SALT_FILE_NAME: &str = ".salt";

/// Random per-installation salt for key derivation.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    /// Generate a fresh salt from the system CSPRNG.
    pub fn generate() -> Result<Self, KeysealError> {
        let rng = SystemRandom::new();
        let mut bytes = [0u8; SALT_LEN];
        rng.fill(&mut bytes)
            .map_err(|_| KeysealError::Internal("failed to generate random salt".to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt([REDACTED])")
    }
}

/// Location of the salt file. Holds no open handle.
#[derive(Debug, Clone)]
pub struct SaltStore {
    path: PathBuf,
}

impl SaltStore {
    /// Salt store at `<data_dir>/.salt`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SALT_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the salt without creating it.
    ///
    /// Returns `Ok(None)` if the file does not exist and a storage error if it
    /// cannot be read or is not exactly [`SALT_LEN`] bytes.
    pub fn load(&self) -> Result<Option<Salt>, KeysealError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(KeysealError::storage_with(
                    format!("failed to read salt file {}", self.path.display()),
                    e,
                ));
            }
        };

        let bytes: [u8; SALT_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            KeysealError::storage(format!(
                "salt file {} is corrupt (expected {SALT_LEN} bytes, found {})",
                self.path.display(),
                b.len()
            ))
        })?;

        Ok(Some(Salt(bytes)))
    }

    /// Return the existing salt, or create the salt file if it is absent.
    pub fn get_or_create(&self) -> Result<Salt, KeysealError> {
        match self.load()? {
            Some(salt) => Ok(salt),
            None => self.create(),
        }
    }

    /// Write a new salt with create-if-absent semantics.
    ///
    /// The bytes are fully written and synced to a temp file first, then linked
    /// into place without replacing an existing file. If another process got
    /// there first, its salt wins and is returned.
    fn create(&self) -> Result<Salt, KeysealError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| {
            KeysealError::storage_with(
                format!("failed to create data directory {}", dir.display()),
                e,
            )
        })?;

        let salt = Salt::generate()?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
            KeysealError::storage_with(format!("failed to create salt file in {}", dir.display()), e)
        })?;
        tmp.write_all(salt.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| KeysealError::storage_with("failed to write salt file", e))?;

        match tmp.persist_noclobber(&self.path) {
            Ok(_) => {
                info!(path = %self.path.display(), "created new salt file");
                if let Err(e) = platform::protect_file(&self.path) {
                    warn!(path = %self.path.display(), error = %e, "could not protect salt file");
                }
                Ok(salt)
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %self.path.display(), "salt file created concurrently -- using existing");
                self.load()?.ok_or_else(|| {
                    KeysealError::storage(format!(
                        "salt file {} disappeared during creation",
                        self.path.display()
                    ))
                })
            }
            Err(e) => Err(KeysealError::storage_with(
                format!("failed to persist salt file {}", self.path.display()),
                e.error,
            )),
        }
    }
}
