//! # Keccak-256 and Address Derivation
//!
//! Addresses are the last 20 bytes of the Keccak-256 hash of the 64-byte
//! uncompressed public key (without the `0x04` SEC1 tag). The same
//! "last 20 bytes of a hash" convention derives deterministic account
//! addresses such as per-participant stake accounts.

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use vouch_core::Address;

/// Keccak-256 of `data` (the pre-standard padding, not SHA3-256).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let hash = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    out
}

/// The address controlled by a secp256k1 public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Uncompressed SEC1: 0x04 || X (32) || Y (32).
    let word = keccak256(&point.as_bytes()[1..]);
    Address::from_word(&word)
}

/// A deterministic address derived from a domain tag and ordered parts.
///
/// `keccak256(domain || part_0 || part_1 || ...)`, last 20 bytes.
pub fn derive_address(domain: &[u8], parts: &[&[u8]]) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update(domain);
    for part in parts {
        hasher.update(part);
    }
    let mut word = [0u8; 32];
    word.copy_from_slice(&hasher.finalize());
    Address::from_word(&word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use vouch_core::hex;

    #[test]
    fn keccak_empty_vector() {
        assert_eq!(
            hex::encode(&keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn address_of_private_key_one() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let key = SigningKey::from_slice(&secret).unwrap();
        let addr = address_of(key.verifying_key());
        assert_eq!(addr.to_hex(), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
    }

    #[test]
    fn derive_address_depends_on_every_part() {
        let a = derive_address(b"domain", &[b"one", b"two"]);
        let b = derive_address(b"domain", &[b"one", b"three"]);
        let c = derive_address(b"other", &[b"one", b"two"]);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, derive_address(b"domain", &[b"one", b"two"]));
    }
}
