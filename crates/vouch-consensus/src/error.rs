//! # Consensus Errors

use thiserror::Error;
use vouch_core::{AccessError, Address, ErrorCategory, ProposalId, RoundId, Tick};
use vouch_crypto::CryptoError;
use vouch_proposal::ProposalState;

/// Errors from consensus round operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// No round with this id.
    #[error("{round_id} not found")]
    RoundNotFound {
        /// The unknown id.
        round_id: RoundId,
    },

    /// No proposal with this id.
    #[error("{proposal_id} not found")]
    ProposalNotFound {
        /// The unknown id.
        proposal_id: ProposalId,
    },

    /// Rounds open only for challenged proposals.
    #[error("{proposal_id} is {state}, not challenged")]
    NotChallenged {
        /// The proposal.
        proposal_id: ProposalId,
        /// Its current state.
        state: ProposalState,
    },

    /// An earlier round for the proposal is still open.
    #[error("{proposal_id} already has open {round_id}")]
    AlreadyInConsensus {
        /// The proposal.
        proposal_id: ProposalId,
        /// The open round.
        round_id: RoundId,
    },

    /// Voter is not in the active set.
    #[error("{voter} is not in the active set")]
    NotInActiveSet {
        /// The rejected voter.
        voter: Address,
    },

    /// Votes are no longer accepted on a finalized round.
    #[error("{round_id} is finalized")]
    RoundFinalized {
        /// The round.
        round_id: RoundId,
    },

    /// The voting window has closed.
    #[error("{round_id}: voting ended at {end_tick}, now {now}")]
    VotingEnded {
        /// The round.
        round_id: RoundId,
        /// Last tick of the window.
        end_tick: Tick,
        /// Current tick.
        now: Tick,
    },

    /// One vote per voter per round.
    #[error("{voter} already voted on {round_id}")]
    AlreadyVoted {
        /// The round.
        round_id: RoundId,
        /// The repeat voter.
        voter: Address,
    },

    /// Signature malformed or not from the voter.
    #[error("invalid vote signature: {0}")]
    InvalidSignature(#[source] CryptoError),

    /// The voting window is still open.
    #[error("{round_id}: voting open until {end_tick}, now {now}")]
    VotingActive {
        /// The round.
        round_id: RoundId,
        /// Last tick of the window.
        end_tick: Tick,
        /// Current tick.
        now: Tick,
    },

    /// The round was already finalized.
    #[error("{round_id} already finalized")]
    AlreadyFinalized {
        /// The round.
        round_id: RoundId,
    },

    /// Caller lacks a role.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The id counter or a tick computation overflowed.
    #[error("consensus arithmetic overflow")]
    Overflow,
}

impl ConsensusError {
    /// Map onto the shared taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RoundNotFound { .. } | Self::ProposalNotFound { .. } => ErrorCategory::NotFound,
            Self::NotChallenged { .. }
            | Self::AlreadyInConsensus { .. }
            | Self::RoundFinalized { .. }
            | Self::AlreadyFinalized { .. } => ErrorCategory::InvalidState,
            Self::NotInActiveSet { .. } | Self::Access(_) => ErrorCategory::Authorization,
            Self::VotingEnded { .. } | Self::VotingActive { .. } => ErrorCategory::Timing,
            Self::AlreadyVoted { .. } | Self::InvalidSignature(_) => ErrorCategory::Integrity,
            Self::Overflow => ErrorCategory::Arithmetic,
        }
    }
}
