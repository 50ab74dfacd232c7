//! # Vote Signer
//!
//! Holds a validator's secp256k1 private key and produces recoverable vote
//! signatures in the format [`recover_signer`](crate::recover_signer)
//! accepts.
//!
//! Does not implement `Serialize`, and `Debug` prints only the address:
//! private keys must not leak into logs or artifacts.

use k256::ecdsa::{RecoveryId, SigningKey};
use rand::rngs::OsRng;
use vouch_core::Address;

use crate::error::CryptoError;
use crate::keccak::address_of;
use crate::signature::VoteSignature;
use crate::vote::{eth_signed_message_hash, VoteMessage};

/// A validator signing key.
pub struct VoteSigner {
    key: SigningKey,
    address: Address,
}

impl VoteSigner {
    /// Generate a fresh key from the operating system RNG.
    pub fn random() -> Self {
        Self::from_key(SigningKey::random(&mut OsRng))
    }

    /// Load a key from its 32-byte secret scalar.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, CryptoError> {
        let key = SigningKey::from_slice(secret)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::from_key(key))
    }

    fn from_key(key: SigningKey) -> Self {
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    /// The address votes from this key recover to.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest as-is, returning a low-`s` signature with
    /// `v ∈ {27, 28}`.
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<VoteSignature, CryptoError> {
        let (sig, mut recovery_id) = self
            .key
            .sign_prehash_recoverable(prehash)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let sig = match sig.normalize_s() {
            Some(low) => {
                recovery_id = RecoveryId::from_byte(recovery_id.to_byte() ^ 1).ok_or_else(|| {
                    CryptoError::SigningFailed("recovery id out of range".to_string())
                })?;
                low
            }
            None => sig,
        };
        if recovery_id.is_x_reduced() {
            return Err(CryptoError::SigningFailed(
                "reduced-x recovery ids are not representable".to_string(),
            ));
        }
        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(VoteSignature::from_parts(&r, &s, 27 + recovery_id.to_byte()))
    }

    /// Sign a vote: the message digest is wrapped with the signed-message
    /// prefix before signing.
    pub fn sign_vote(&self, message: &VoteMessage) -> Result<VoteSignature, CryptoError> {
        self.sign_prehash(&eth_signed_message_hash(&message.digest()))
    }
}

impl std::fmt::Debug for VoteSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
