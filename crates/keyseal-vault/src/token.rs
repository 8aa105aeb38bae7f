// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret token wire format: `enc:<version>:<base64url payload>`.
//!
//! Only `v1` is produced today. Other well-formed versions are still
//! recognized as tokens so they are never re-encrypted or migrated, but the
//! codec rejects them on decryption.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use std::num::NonZeroU32;

use crate::codec::RejectReason;
use crate::kdf;

/// Prefix shared by every token version.
pub const TOKEN_MARKER: &str = "enc:";

/// Token format versions this build can decrypt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenVersion {
    /// PBKDF2-HMAC-SHA256 key, AES-256-GCM payload, header as associated data.
    V1,
}

impl TokenVersion {
    /// Version produced by `encrypt`.
    pub const CURRENT: TokenVersion = TokenVersion::V1;

    pub fn tag(self) -> &'static str {
        match self {
            TokenVersion::V1 => "v1",
        }
    }

    /// PBKDF2 work factor the version's key is derived with. Fixed per
    /// version: changing it requires a new version tag.
    pub fn iterations(self) -> NonZeroU32 {
        match self {
            TokenVersion::V1 => kdf::DEFAULT_ITERATIONS,
        }
    }

    /// Full prefix, e.g. `enc:v1:`. Also bound as AEAD associated data.
    pub fn header(self) -> &'static str {
        match self {
            TokenVersion::V1 => "enc:v1:",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "v1" => Some(TokenVersion::V1),
            _ => None,
        }
    }
}

/// A value split into its version tag and payload. No decoding performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedToken<'a> {
    pub version_tag: &'a str,
    pub payload: &'a str,
}

impl ParsedToken<'_> {
    /// Resolve the version tag against the versions this build supports.
    pub fn version(&self) -> Result<TokenVersion, RejectReason> {
        TokenVersion::from_tag(self.version_tag)
            .ok_or_else(|| RejectReason::UnsupportedVersion(self.version_tag.to_string()))
    }

    /// Decode the base64 payload into the sealed bytes.
    pub fn decode_payload(&self) -> Result<Vec<u8>, RejectReason> {
        URL_SAFE_NO_PAD
            .decode(self.payload)
            .map_err(|_| RejectReason::InvalidEncoding)
    }
}

/// Split `value` into version and payload if it has the token shape
/// `enc:v<digits>:...`.
pub fn parse(value: &str) -> Option<ParsedToken<'_>> {
    let rest = value.strip_prefix(TOKEN_MARKER)?;
    let (version_tag, payload) = rest.split_once(':')?;
    let digits = version_tag.strip_prefix('v')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(ParsedToken {
        version_tag,
        payload,
    })
}

/// Whether `value` is already a secret token. Pure format check.
pub fn is_token(value: &str) -> bool {
    parse(value).is_some()
}

/// Render sealed bytes as a token of the given version.
pub fn format(version: TokenVersion, sealed: &[u8]) -> String {
    let mut token = String::from(version.header());
    URL_SAFE_NO_PAD.encode_string(sealed, &mut token);
    token
}
