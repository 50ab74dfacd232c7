//! # Proposal Store Errors

use thiserror::Error;
use vouch_core::{AccessError, Address, ErrorCategory, ProposalId, Tick};

use crate::proposal::ProposalState;

/// Errors from proposal lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    /// No proposal with this id.
    #[error("{id} not found")]
    NotFound {
        /// The unknown id.
        id: ProposalId,
    },

    /// Content hash is all zeros.
    #[error("content hash must be non-zero")]
    InvalidContentHash,

    /// Metadata is empty.
    #[error("metadata must be non-empty")]
    EmptyMetadata,

    /// The proposal's state does not permit the transition.
    #[error("{id}: invalid transition {from} -> {to}")]
    InvalidStateTransition {
        /// The proposal.
        id: ProposalId,
        /// Current state.
        from: ProposalState,
        /// Attempted target.
        to: ProposalState,
    },

    /// Only optimistically approved proposals can be challenged.
    #[error("{id} is {state}, not challengeable")]
    NotChallengeable {
        /// The proposal.
        id: ProposalId,
        /// Current state.
        state: ProposalState,
    },

    /// The challenge window has closed.
    #[error("{id}: challenge window ended at {window_end}, now {now}")]
    ChallengeWindowExpired {
        /// The proposal.
        id: ProposalId,
        /// Last tick at which a challenge was allowed.
        window_end: Tick,
        /// Current tick.
        now: Tick,
    },

    /// The challenge window is still open.
    #[error("{id}: challenge window open until {window_end}, now {now}")]
    ChallengeWindowActive {
        /// The proposal.
        id: ProposalId,
        /// Last tick of the window.
        window_end: Tick,
        /// Current tick.
        now: Tick,
    },

    /// Caller is not in the active set.
    #[error("{caller} is not an active participant")]
    NotActiveParticipant {
        /// The rejected caller.
        caller: Address,
    },

    /// The participant already recorded an approval.
    #[error("{participant} already approved {id}")]
    AlreadyApproved {
        /// The proposal.
        id: ProposalId,
        /// The repeat approver.
        participant: Address,
    },

    /// Caller lacks a role.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The id counter or a window computation overflowed.
    #[error("proposal arithmetic overflow")]
    Overflow,
}

impl ProposalError {
    /// Map onto the shared taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidContentHash | Self::EmptyMetadata | Self::AlreadyApproved { .. } => {
                ErrorCategory::Integrity
            }
            Self::InvalidStateTransition { .. } | Self::NotChallengeable { .. } => {
                ErrorCategory::InvalidState
            }
            Self::ChallengeWindowExpired { .. } | Self::ChallengeWindowActive { .. } => {
                ErrorCategory::Timing
            }
            Self::NotActiveParticipant { .. } | Self::Access(_) => ErrorCategory::Authorization,
            Self::Overflow => ErrorCategory::Arithmetic,
        }
    }
}
