// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.
//!
//! Sealed layout: `nonce (12) || ciphertext || tag (16)`.

use keyseal_core::KeysealError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::codec::RejectReason;
use crate::kdf::KEY_LEN;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// Smallest valid sealed payload (empty plaintext).
pub const MIN_SEALED_LEN: usize = NONCE_LEN + TAG_LEN;

/// Encrypt `plaintext`, binding `aad` into the authentication tag.
pub fn seal(key: &[u8; KEY_LEN], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, KeysealError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| KeysealError::Internal("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| KeysealError::Internal("failed to generate random nonce".to_string()))?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = Zeroizing::new(plaintext.to_vec());
    less_safe
        .seal_in_place_append_tag(nonce, Aad::from(aad), &mut *in_out)
        .map_err(|_| KeysealError::Internal("AES-256-GCM encryption failed".to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&in_out);
    Ok(sealed)
}

/// Decrypt a payload produced by [`seal`] with the same `aad`.
///
/// Fails with [`RejectReason::Unauthenticated`] if the key is wrong or any
/// byte of the payload or `aad` was altered. The plaintext is decrypted in
/// place and only ever lives in the returned zeroizing buffer.
pub fn open(
    key: &[u8; KEY_LEN],
    aad: &[u8],
    sealed: &[u8],
) -> Result<Zeroizing<Vec<u8>>, RejectReason> {
    if sealed.len() < MIN_SEALED_LEN {
        return Err(RejectReason::Truncated { len: sealed.len() });
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| RejectReason::Truncated { len: sealed.len() })?;

    let unbound =
        UnboundKey::new(&AES_256_GCM, key).map_err(|_| RejectReason::Unauthenticated)?;
    let less_safe = LessSafeKey::new(unbound);

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let len = less_safe
        .open_in_place(nonce, Aad::from(aad), in_out.as_mut_slice())
        .map_err(|_| RejectReason::Unauthenticated)?
        .len();
    in_out.truncate(len);
    Ok(in_out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        SystemRandom::new().fill(&mut key).unwrap();
        key
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = random_key();
        let sealed = seal(&key, b"enc:v1:", b"secret api key value").unwrap();
        let opened = open(&key, b"enc:v1:", &sealed).unwrap();
        assert_eq!(opened.as_slice(), b"secret api key value");
    }

    #[test]
    fn open_strips_tag_from_plaintext_buffer() {
        let key = random_key();
        let sealed = seal(&key, b"", b"hello").unwrap();
        let opened = open(&key, b"", &sealed).unwrap();
        assert_eq!(opened.len(), 5);
        assert_eq!(opened.as_slice(), b"hello");
    }

    #[test]
    fn seal_uses_fresh_nonce_each_time() {
        let key = random_key();
        let a = seal(&key, b"", b"same input twice").unwrap();
        let b = seal(&key, b"", b"same input twice").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn sealed_length_is_nonce_plus_plaintext_plus_tag() {
        let key = random_key();
        let sealed = seal(&key, b"", b"hello").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn wrong_key_is_unauthenticated() {
        let sealed = seal(&random_key(), b"", b"secret data").unwrap();
        assert_eq!(
            open(&random_key(), b"", &sealed),
            Err(RejectReason::Unauthenticated)
        );
    }

    #[test]
    fn tampered_ciphertext_or_aad_is_unauthenticated() {
        let key = random_key();
        let mut sealed = seal(&key, b"enc:v1:", b"do not tamper").unwrap();

        assert_eq!(
            open(&key, b"enc:v2:", &sealed),
            Err(RejectReason::Unauthenticated)
        );

        sealed[NONCE_LEN] ^= 0x01;
        assert_eq!(
            open(&key, b"enc:v1:", &sealed),
            Err(RejectReason::Unauthenticated)
        );
    }

    #[test]
    fn short_payload_is_truncated() {
        let key = random_key();
        assert_eq!(
            open(&key, b"", &[0u8; MIN_SEALED_LEN - 1]),
            Err(RejectReason::Truncated {
                len: MIN_SEALED_LEN - 1
            })
        );
    }
}
