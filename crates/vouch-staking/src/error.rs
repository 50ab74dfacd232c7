//! # Stake Ledger Errors

use thiserror::Error;
use vouch_core::{AccessError, Address, Amount, ErrorCategory, Tick};
use vouch_token::TokenError;

use crate::participant::ParticipantStatus;

/// Errors from stake ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakingError {
    /// No participant record for this address.
    #[error("participant {participant} not found")]
    NotFound {
        /// The unknown address.
        participant: Address,
    },

    /// Amount must be non-zero.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// First deposit for an address that already has a record.
    #[error("participant {participant} is already registered")]
    AlreadyRegistered {
        /// The existing participant.
        participant: Address,
    },

    /// Resulting stake would be below the minimum.
    #[error("stake {actual} is below the minimum {required}")]
    InsufficientStake {
        /// Configured minimum.
        required: Amount,
        /// Stake the operation would leave.
        actual: Amount,
    },

    /// Withdrawal larger than the current stake.
    #[error("withdrawal of {requested} exceeds stake {staked}")]
    ExceedsStake {
        /// Requested withdrawal.
        requested: Amount,
        /// Current stake.
        staked: Amount,
    },

    /// Participant's status does not allow the operation.
    #[error("participant {participant} is {status}, not active")]
    NotActive {
        /// The participant.
        participant: Address,
        /// Their current status.
        status: ParticipantStatus,
    },

    /// A withdrawal is already waiting out its bonding period.
    #[error("participant {participant} already has a pending withdrawal")]
    WithdrawalPending {
        /// The participant.
        participant: Address,
    },

    /// Completion requested without a pending withdrawal.
    #[error("participant {participant} has no pending withdrawal")]
    NoPendingWithdrawal {
        /// The participant.
        participant: Address,
    },

    /// Bonding period has not yet elapsed.
    #[error("bonding period not met: available at {available_at}, now {now}")]
    BondingPeriodNotMet {
        /// First tick at which completion succeeds.
        available_at: Tick,
        /// Current tick.
        now: Tick,
    },

    /// Caller lacks a role.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The token ledger refused a transfer.
    #[error("token transfer failed: {0}")]
    Token(#[from] TokenError),

    /// Configuration rejected.
    #[error("invalid staking configuration: {0}")]
    InvalidConfig(String),

    /// Checked arithmetic overflowed.
    #[error("stake arithmetic overflow")]
    Overflow,
}

impl StakingError {
    /// Map onto the shared taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::ZeroAmount | Self::AlreadyRegistered { .. } | Self::InvalidConfig(_) => {
                ErrorCategory::Integrity
            }
            Self::InsufficientStake { .. } | Self::ExceedsStake { .. } => ErrorCategory::Threshold,
            Self::NotActive { .. }
            | Self::WithdrawalPending { .. }
            | Self::NoPendingWithdrawal { .. } => ErrorCategory::InvalidState,
            Self::BondingPeriodNotMet { .. } => ErrorCategory::Timing,
            Self::Access(_) => ErrorCategory::Authorization,
            Self::Token(_) => ErrorCategory::External,
            Self::Overflow => ErrorCategory::Arithmetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(StakingError::ZeroAmount.category(), ErrorCategory::Integrity);
        assert_eq!(
            StakingError::InsufficientStake {
                required: 1000,
                actual: 10
            }
            .category(),
            ErrorCategory::Threshold
        );
        assert_eq!(
            StakingError::BondingPeriodNotMet {
                available_at: Tick::new(10),
                now: Tick::new(5)
            }
            .category(),
            ErrorCategory::Timing
        );
        assert_eq!(
            StakingError::Token(TokenError::Overflow).category(),
            ErrorCategory::External
        );
    }

    #[test]
    fn not_active_display_names_status() {
        let err = StakingError::NotActive {
            participant: Address::from_bytes([4; 20]),
            status: ParticipantStatus::Unstaking,
        };
        assert!(err.to_string().contains("UNSTAKING"));
    }
}
