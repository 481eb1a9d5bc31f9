//! Content fingerprinting
//!
//! A submission is identified for duplicate detection only by the SHA-256
//! digest of its raw bytes. Filename, student and task never enter the digest.

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a hex-encoded SHA-256 digest
pub const CONTENT_HASH_LEN: usize = 64;

/// Lowercase hex SHA-256 digest of a submission's bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Fingerprint raw content
    pub fn of(content: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_ref());
        Self(hex::encode(hasher.finalize()))
    }

    /// Parse an already computed digest received over the wire
    pub fn parse(value: &str) -> Result<Self> {
        let well_formed = value.len() == CONTENT_HASH_LEN
            && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));

        if well_formed {
            Ok(Self(value.to_string()))
        } else {
            Err(AppError::InvalidFormat {
                message: format!(
                    "content hash must be {} lowercase hex characters",
                    CONTENT_HASH_LEN
                ),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let hash = ContentHash::of("abc");
        assert_eq!(
            hash.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hashing_is_deterministic() {
        let first = ContentHash::of(b"def solve(): return 42\n");
        let second = ContentHash::of(b"def solve(): return 42\n".to_vec());
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), CONTENT_HASH_LEN);
    }

    #[test]
    fn test_single_byte_changes_digest() {
        assert_ne!(ContentHash::of("essay v1"), ContentHash::of("essay v2"));
    }

    #[test]
    fn test_parse_accepts_own_output() {
        let hash = ContentHash::of("X");
        assert_eq!(ContentHash::parse(hash.as_str()).unwrap(), hash);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ContentHash::parse("abc").is_err());
        assert!(ContentHash::parse(&"A".repeat(CONTENT_HASH_LEN)).is_err());
        assert!(ContentHash::parse(&"g".repeat(CONTENT_HASH_LEN)).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let ok: std::result::Result<ContentHash, _> =
            serde_json::from_value(serde_json::json!("0".repeat(CONTENT_HASH_LEN)));
        assert!(ok.is_ok());

        let bad: std::result::Result<ContentHash, _> =
            serde_json::from_value(serde_json::json!("not-a-hash"));
        assert!(bad.is_err());
    }
}
