//! # vouch-crypto — Cryptographic Primitives for Vouch
//!
//! - **Keccak-256** hashing and address derivation.
//! - **Vote digests**: the exact byte layout validators sign when voting in a
//!   consensus round or a dispute, plus the prefixed-message wrapping applied
//!   before signing.
//! - **Signer recovery**: secp256k1 public-key recovery from a 65-byte
//!   `r || s || v` signature, compared against the claimed voter address.
//! - **VoteSigner**: a private key wrapper that produces signatures in the
//!   same format, used by validator tooling and tests.

pub mod error;
pub mod keccak;
pub mod signature;
pub mod signer;
pub mod vote;

pub use error::CryptoError;
pub use keccak::{address_of, derive_address, keccak256};
pub use signature::{recover_signer, VoteSignature};
pub use signer::VoteSigner;
pub use vote::{
    eth_signed_message_hash, verify_vote, vote_digest, VoteDomain, VoteMessage,
    CONSENSUS_VOTE_TAG, DISPUTE_VOTE_TAG,
};
