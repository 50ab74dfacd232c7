//! # Content Hash — Proposal Fingerprints
//!
//! A proposal's content is referenced by an opaque 32-byte fingerprint. The
//! protocol never interprets the bytes; it only requires them to be non-zero
//! so that an unset field can never be mistaken for a real submission.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::hex;

/// An opaque 32-byte content fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// The all-zero hash. Never a valid proposal fingerprint.
    pub const ZERO: ContentHash = ContentHash([0u8; 32]);

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(&self.0)
    }

    /// Parse from a 64-digit hex string with optional `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        hex::decode_array::<32>(s).map(Self)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentHash({}...)", &self.to_hex()[..10])
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_detection() {
        assert!(ContentHash::ZERO.is_zero());
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        assert!(!ContentHash::from_bytes(bytes).is_zero());
    }

    #[test]
    fn debug_is_truncated() {
        let h = ContentHash::from_bytes([0xcd; 32]);
        assert_eq!(format!("{h:?}"), "ContentHash(0xcdcdcdcd...)");
    }

    #[test]
    fn serde_hex() {
        let h = ContentHash::from_bytes([0x0f; 32]);
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }
}
