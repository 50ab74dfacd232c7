//! # Recoverable Signatures
//!
//! Votes carry a 65-byte `r || s || v` signature. The voter's address is not
//! transmitted separately from the signature's point of view: it is
//! recovered from `(digest, r, s, v)` and then compared to the claimed voter.
//!
//! ## Security Invariant
//!
//! Only low-`s` signatures are accepted. For every valid `(r, s)` the pair
//! `(r, n - s)` is also valid; rejecting the upper half removes that
//! malleability so one vote has exactly one accepted encoding.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use vouch_core::{hex, Address};

use crate::error::CryptoError;
use crate::keccak::address_of;

/// A 65-byte recoverable secp256k1 signature: `r (32) || s (32) || v (1)`.
///
/// `v` may be encoded as `0`/`1` or `27`/`28`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VoteSignature([u8; 65]);

impl VoteSignature {
    /// Signature length in bytes.
    pub const LEN: usize = 65;

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    /// Create from a byte slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != Self::LEN {
            return Err(CryptoError::InvalidSignatureLength(bytes.len()));
        }
        let mut out = [0u8; 65];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Assemble from `r`, `s` and the recovery byte.
    pub fn from_parts(r: &[u8; 32], s: &[u8; 32], v: u8) -> Self {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(r);
        out[32..64].copy_from_slice(s);
        out[64] = v;
        Self(out)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// The recovery byte as transmitted.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode_prefixed(&self.0)
    }

    /// Parse from a 130-digit hex string with optional `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::HexDecode(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    fn recovery_id(&self) -> Result<RecoveryId, CryptoError> {
        let normalized = match self.v() {
            0 | 27 => 0,
            1 | 28 => 1,
            other => return Err(CryptoError::InvalidRecoveryId(other)),
        };
        RecoveryId::from_byte(normalized).ok_or(CryptoError::InvalidRecoveryId(self.v()))
    }

    fn signature(&self) -> Result<Signature, CryptoError> {
        let sig = Signature::from_slice(&self.0[..64])
            .map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
        if sig.normalize_s().is_some() {
            return Err(CryptoError::MalformedSignature(
                "s is in the upper half of the curve order".to_string(),
            ));
        }
        Ok(sig)
    }
}

impl std::fmt::Debug for VoteSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VoteSignature({}...)", &self.to_hex()[..18])
    }
}

impl Serialize for VoteSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for VoteSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Recover the address that produced `signature` over the 32-byte `prehash`.
///
/// # Errors
///
/// Fails on a bad recovery byte, a malformed or high-`s` signature, or when
/// no public key can be recovered.
pub fn recover_signer(prehash: &[u8; 32], signature: &VoteSignature) -> Result<Address, CryptoError> {
    let recovery_id = signature.recovery_id()?;
    let sig = signature.signature()?;
    let key = VerifyingKey::recover_from_prehash(prehash, &sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    Ok(address_of(&key))
}
