//! # Cryptographic Error Types
//!
//! Structured errors for signature parsing and signer recovery.

use thiserror::Error;
use vouch_core::{Address, ErrorCategory};

/// Errors from cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature is not 65 bytes.
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// Recovery byte is not one of 0, 1, 27, 28.
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// `r` or `s` is out of range, or `s` is in the upper half of the curve
    /// order (malleable form).
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// No public key could be recovered from the signature.
    #[error("signer recovery failed: {0}")]
    RecoveryFailed(String),

    /// The recovered signer is not the claimed voter.
    #[error("signature recovered {recovered}, expected {expected}")]
    SignerMismatch {
        /// The address the vote claims to come from.
        expected: Address,
        /// The address actually recovered from the signature.
        recovered: Address,
    },

    /// Private key bytes are not a valid secp256k1 scalar.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Signing failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Hex decoding failed.
    #[error("hex decode error: {0}")]
    HexDecode(String),
}

impl CryptoError {
    /// Every cryptographic failure is an integrity violation.
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Integrity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_length_display() {
        let msg = CryptoError::InvalidSignatureLength(64).to_string();
        assert!(msg.contains("65 bytes"));
        assert!(msg.contains("64"));
    }

    #[test]
    fn signer_mismatch_display() {
        let err = CryptoError::SignerMismatch {
            expected: Address::from_bytes([1; 20]),
            recovered: Address::from_bytes([2; 20]),
        };
        let msg = err.to_string();
        assert!(msg.contains("0x0101"));
        assert!(msg.contains("0x0202"));
    }

    #[test]
    fn all_variants_are_integrity() {
        let variants = [
            CryptoError::InvalidSignatureLength(0),
            CryptoError::InvalidRecoveryId(5),
            CryptoError::MalformedSignature("s".into()),
            CryptoError::RecoveryFailed("r".into()),
            CryptoError::InvalidPrivateKey("k".into()),
            CryptoError::SigningFailed("x".into()),
            CryptoError::HexDecode("h".into()),
        ];
        for v in variants {
            assert_eq!(v.category(), ErrorCategory::Integrity);
        }
    }
}
