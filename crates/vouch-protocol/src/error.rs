//! # Protocol Errors
//!
//! Component errors pass through unchanged so callers can match on the
//! precise failure; [`ProtocolError::category`] flattens them onto the shared
//! taxonomy.

use thiserror::Error;
use vouch_consensus::ConsensusError;
use vouch_core::{ErrorCategory, ReentrancyError, Tick};
use vouch_dispute::DisputeError;
use vouch_proposal::ProposalError;
use vouch_staking::StakingError;
use vouch_token::TokenError;

use crate::config::ConfigError;

/// Errors from protocol operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Stake ledger failure.
    #[error(transparent)]
    Staking(#[from] StakingError),

    /// Proposal store failure.
    #[error(transparent)]
    Proposal(#[from] ProposalError),

    /// Consensus engine failure.
    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    /// Dispute game failure.
    #[error(transparent)]
    Dispute(#[from] DisputeError),

    /// Token ledger failure outside a component operation.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A mutating operation was entered while another was in progress.
    #[error(transparent)]
    Reentrant(#[from] ReentrancyError),

    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The clock cannot move backwards.
    #[error("clock cannot move from {now} back to {requested}")]
    ClockRegression {
        /// Current tick.
        now: Tick,
        /// Requested tick.
        requested: Tick,
    },

    /// `revalidate` without a configured oracle.
    #[error("no validity oracle configured")]
    OracleNotConfigured,

    /// Checked arithmetic overflowed.
    #[error("protocol arithmetic overflow")]
    Overflow,
}

impl ProtocolError {
    /// Map onto the shared taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Staking(e) => e.category(),
            Self::Proposal(e) => e.category(),
            Self::Consensus(e) => e.category(),
            Self::Dispute(e) => e.category(),
            Self::Token(e) => e.category(),
            Self::Reentrant(_) | Self::ClockRegression { .. } => ErrorCategory::InvalidState,
            Self::Config(_) => ErrorCategory::Integrity,
            Self::OracleNotConfigured => ErrorCategory::External,
            Self::Overflow => ErrorCategory::Arithmetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_core::{Address, ProposalId};

    #[test]
    fn component_categories_pass_through() {
        let err: ProtocolError = ProposalError::NotFound {
            id: ProposalId::new(3),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::NotFound);

        let err: ProtocolError = StakingError::ZeroAmount.into();
        assert_eq!(err.category(), ErrorCategory::Integrity);

        let err: ProtocolError = DisputeError::NotActiveParticipant {
            caller: Address::ZERO,
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Authorization);
    }

    #[test]
    fn reentrancy_is_a_state_error() {
        let err: ProtocolError = ReentrancyError { operation: "deposit" }.into();
        assert_eq!(err.category(), ErrorCategory::InvalidState);
        assert_eq!(err.to_string(), "re-entrant call to deposit rejected");
    }
}
