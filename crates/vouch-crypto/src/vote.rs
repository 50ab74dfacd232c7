//! # Signed Vote Messages
//!
//! Defines the exact bytes a validator signs to vote in a consensus round or
//! a dispute. The layout must be reproduced bit-for-bit by any external
//! signer:
//!
//! ```text
//! inner  = keccak256( tag
//!                  || uint256_be(id)
//!                  || voter              (20 bytes)
//!                  || support            (1 byte, 0x00 / 0x01)
//!                  || verifying_contract (20 bytes)
//!                  || uint256_be(chain_id) )
//! digest = keccak256( "\x19Ethereum Signed Message:\n32" || inner )
//! ```
//!
//! The signature over `digest` is then recovered and compared to `voter`.
//!
//! ## Security Invariant
//!
//! Binding the tag, the contract identity and the chain id into every vote
//! means a signature collected for one round, dispute, deployment, or
//! network cannot be replayed against another. Consensus votes and dispute
//! votes use different tags, so a consensus vote on round 3 is never a valid
//! dispute vote on dispute 3.

use vouch_core::Address;

use crate::error::CryptoError;
use crate::keccak::keccak256;
use crate::signature::{recover_signer, VoteSignature};

/// Domain tag for consensus-round votes.
pub const CONSENSUS_VOTE_TAG: &[u8] = b"VOUCH_CONSENSUS_VOTE_V1";

/// Domain tag for dispute votes.
pub const DISPUTE_VOTE_TAG: &[u8] = b"VOUCH_DISPUTE_VOTE_V1";

const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Where a vote is valid: which kind of vote, which contract, which network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteDomain {
    /// Domain tag distinguishing vote kinds.
    pub tag: &'static [u8],
    /// Identity of the component that counts the vote.
    pub verifying_contract: Address,
    /// Network identity.
    pub chain_id: u64,
}

impl VoteDomain {
    /// Domain for consensus-round votes.
    pub fn consensus(verifying_contract: Address, chain_id: u64) -> Self {
        Self {
            tag: CONSENSUS_VOTE_TAG,
            verifying_contract,
            chain_id,
        }
    }

    /// Domain for dispute votes.
    pub fn dispute(verifying_contract: Address, chain_id: u64) -> Self {
        Self {
            tag: DISPUTE_VOTE_TAG,
            verifying_contract,
            chain_id,
        }
    }
}

/// One voter's yes/no on one round or dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteMessage {
    /// Where the vote is valid.
    pub domain: VoteDomain,
    /// Round id or dispute id.
    pub id: u64,
    /// Claimed voter.
    pub voter: Address,
    /// `true` for yes.
    pub support: bool,
}

impl VoteMessage {
    /// The packed preimage of the inner hash.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.domain.tag.len() + 32 + 20 + 1 + 20 + 32);
        out.extend_from_slice(self.domain.tag);
        out.extend_from_slice(&uint256_be(self.id));
        out.extend_from_slice(self.voter.as_bytes());
        out.push(u8::from(self.support));
        out.extend_from_slice(self.domain.verifying_contract.as_bytes());
        out.extend_from_slice(&uint256_be(self.domain.chain_id));
        out
    }

    /// The inner hash, before prefix wrapping.
    pub fn digest(&self) -> [u8; 32] {
        keccak256(&self.encode())
    }
}

/// Inner vote hash for the given fields.
pub fn vote_digest(domain: VoteDomain, id: u64, voter: Address, support: bool) -> [u8; 32] {
    VoteMessage {
        domain,
        id,
        voter,
        support,
    }
    .digest()
}

/// Wrap a 32-byte hash with the signed-message prefix.
pub fn eth_signed_message_hash(hash: &[u8; 32]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(SIGNED_MESSAGE_PREFIX.len() + 32);
    buf.extend_from_slice(SIGNED_MESSAGE_PREFIX);
    buf.extend_from_slice(hash);
    keccak256(&buf)
}

/// Check that `signature` over `message` recovers to `message.voter`.
///
/// # Errors
///
/// Returns the recovery error, or [`CryptoError::SignerMismatch`] when a
/// different address signed.
pub fn verify_vote(message: &VoteMessage, signature: &VoteSignature) -> Result<(), CryptoError> {
    let digest = eth_signed_message_hash(&message.digest());
    let recovered = recover_signer(&digest, signature)?;
    if recovered != message.voter {
        return Err(CryptoError::SignerMismatch {
            expected: message.voter,
            recovered,
        });
    }
    Ok(())
}

fn uint256_be(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}
