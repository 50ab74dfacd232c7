//! # Consensus Parameters
//!
//! Quorum and window length are protocol constants. The vote domain
//! (contract identity and chain id) is per deployment.

use serde::{Deserialize, Serialize};
use vouch_core::Address;
use vouch_crypto::VoteDomain;

/// Participation required for an approval, in percent of the active set.
pub const QUORUM_PCT: u64 = 60;

/// Length of a consensus voting window in ticks.
pub const VOTING_PERIOD: u64 = 100;

/// Deployment identity bound into every consensus vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Identity of the engine as a vote verifier.
    pub verifying_contract: Address,
    /// Network identity.
    pub chain_id: u64,
}

impl ConsensusConfig {
    /// The signing domain for this deployment's consensus votes.
    pub fn vote_domain(&self) -> VoteDomain {
        VoteDomain::consensus(self.verifying_contract, self.chain_id)
    }
}
