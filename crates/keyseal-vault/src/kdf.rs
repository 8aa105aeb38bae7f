// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from the machine identity.
//!
//! The derived key is never persisted; it is recomputed for every
//! encrypt/decrypt call and wiped on drop.

use std::num::NonZeroU32;

use ring::pbkdf2;
use zeroize::Zeroizing;

use crate::salt::Salt;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Production work factor for v1 tokens.
pub const PBKDF2_ITERATIONS: u32 = 480_000;

/// [`PBKDF2_ITERATIONS`] as the type `ring` expects.
pub const DEFAULT_ITERATIONS: NonZeroU32 = match NonZeroU32::new(PBKDF2_ITERATIONS) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

/// Derive a 32-byte key from `identity` and `salt`.
///
/// Deterministic: identical inputs always produce the identical key.
pub fn derive_key(identity: &[u8], salt: &Salt, iterations: NonZeroU32) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt.as_bytes(),
        identity,
        key.as_mut(),
    );
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> NonZeroU32 {
        NonZeroU32::new(2).unwrap()
    }

    #[test]
    fn matches_known_pbkdf2_sha256_vector() {
        // P = "password", S = "salt", c = 1. Salt is not 16 bytes, so call ring directly.
        let mut out = [0u8; 32];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            NonZeroU32::new(1).unwrap(),
            b"salt",
            b"password",
            &mut out,
        );
        assert_eq!(
            hex::encode(out),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
    }

    #[test]
    fn derive_key_is_deterministic() {
        let salt = Salt::from_bytes([7u8; 16]);
        let key1 = derive_key(b"host|linux-x86_64|alice", &salt, fast());
        let key2 = derive_key(b"host|linux-x86_64|alice", &salt, fast());
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn different_identity_produces_different_key() {
        let salt = Salt::from_bytes([7u8; 16]);
        let key1 = derive_key(b"machine-a", &salt, fast());
        let key2 = derive_key(b"machine-b", &salt, fast());
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn different_salt_produces_different_key() {
        let key1 = derive_key(b"machine-a", &Salt::from_bytes([1u8; 16]), fast());
        let key2 = derive_key(b"machine-a", &Salt::from_bytes([2u8; 16]), fast());
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn production_work_factor_is_480k() {
        assert_eq!(DEFAULT_ITERATIONS.get(), 480_000);
    }
}
