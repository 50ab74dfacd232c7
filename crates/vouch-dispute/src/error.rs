//! # Dispute Game Errors

use thiserror::Error;
use vouch_core::{AccessError, Address, Amount, DisputeId, ErrorCategory, ProposalId, Tick};
use vouch_crypto::CryptoError;
use vouch_proposal::ProposalError;
use vouch_staking::StakingError;
use vouch_token::TokenError;

use crate::dispute::DisputeState;

/// Errors from dispute game operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisputeError {
    /// No dispute with this id.
    #[error("{dispute_id} not found")]
    NotFound {
        /// The unknown id.
        dispute_id: DisputeId,
    },

    /// Caller is not in the active set.
    #[error("{caller} is not an active participant")]
    NotActiveParticipant {
        /// The rejected caller.
        caller: Address,
    },

    /// Bond must be non-zero.
    #[error("bond must be greater than zero")]
    ZeroBond,

    /// Bond below the configured minimum.
    #[error("bond {bond} is below the minimum {minimum}")]
    BelowMinimumBond {
        /// Configured minimum.
        minimum: Amount,
        /// Offered bond.
        bond: Amount,
    },

    /// The proposal is not open to challenge.
    #[error("{proposal_id} cannot be disputed: {reason}")]
    NotDisputable {
        /// The proposal.
        proposal_id: ProposalId,
        /// Why the proposal store refused.
        #[source]
        reason: ProposalError,
    },

    /// The dispute is no longer taking votes or resolution.
    #[error("{dispute_id} is {state}, not active")]
    NotActive {
        /// The dispute.
        dispute_id: DisputeId,
        /// Its current state.
        state: DisputeState,
    },

    /// The voting window has closed.
    #[error("{dispute_id}: voting ended at {voting_end}, now {now}")]
    VotingEnded {
        /// The dispute.
        dispute_id: DisputeId,
        /// Last tick of the window.
        voting_end: Tick,
        /// Current tick.
        now: Tick,
    },

    /// One vote per voter per dispute.
    #[error("{voter} already voted on {dispute_id}")]
    AlreadyVoted {
        /// The dispute.
        dispute_id: DisputeId,
        /// The repeat voter.
        voter: Address,
    },

    /// Signature malformed or not from the voter.
    #[error("invalid vote signature: {0}")]
    InvalidSignature(#[source] CryptoError),

    /// The voting window is still open.
    #[error("{dispute_id}: voting open until {voting_end}, now {now}")]
    VotingActive {
        /// The dispute.
        dispute_id: DisputeId,
        /// Last tick of the window.
        voting_end: Tick,
        /// Current tick.
        now: Tick,
    },

    /// Cancellation from a state other than Active.
    #[error("{dispute_id} is {state}; only active disputes can be cancelled")]
    InvalidState {
        /// The dispute.
        dispute_id: DisputeId,
        /// Its current state.
        state: DisputeState,
    },

    /// The escrow account holds less than the bonds of the active disputes.
    #[error("escrow holds {available}, needs {required}")]
    EscrowShortfall {
        /// Sum of active bonds.
        required: Amount,
        /// Escrow balance.
        available: Amount,
    },

    /// Caller lacks a role.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The stake ledger refused the slash.
    #[error("slash failed: {0}")]
    Staking(#[from] StakingError),

    /// The token ledger refused a transfer.
    #[error("token transfer failed: {0}")]
    Token(#[from] TokenError),

    /// Configuration rejected.
    #[error("invalid dispute configuration: {0}")]
    InvalidConfig(String),

    /// Checked arithmetic overflowed.
    #[error("dispute arithmetic overflow")]
    Overflow,
}

impl DisputeError {
    /// Map onto the shared taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::NotActiveParticipant { .. } | Self::Access(_) => ErrorCategory::Authorization,
            Self::ZeroBond | Self::AlreadyVoted { .. } | Self::InvalidSignature(_) => {
                ErrorCategory::Integrity
            }
            Self::InvalidConfig(_) => ErrorCategory::Integrity,
            Self::BelowMinimumBond { .. } => ErrorCategory::Threshold,
            Self::NotDisputable { reason, .. } => match reason.category() {
                ErrorCategory::Timing => ErrorCategory::Timing,
                ErrorCategory::NotFound => ErrorCategory::NotFound,
                _ => ErrorCategory::InvalidState,
            },
            Self::NotActive { .. } | Self::InvalidState { .. } => ErrorCategory::InvalidState,
            Self::VotingEnded { .. } | Self::VotingActive { .. } => ErrorCategory::Timing,
            Self::EscrowShortfall { .. } | Self::Token(_) => ErrorCategory::External,
            Self::Staking(e) => e.category(),
            Self::Overflow => ErrorCategory::Arithmetic,
        }
    }
}
