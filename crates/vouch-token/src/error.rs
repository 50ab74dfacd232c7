//! # Collaborator Error Types

use thiserror::Error;
use vouch_core::{Address, Amount, ErrorCategory};

/// Errors from the token ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The source account cannot cover the transfer.
    #[error("insufficient balance in {account}: have {balance}, need {required}")]
    InsufficientBalance {
        /// Debited account.
        account: Address,
        /// Current balance.
        balance: Amount,
        /// Amount requested.
        required: Amount,
    },

    /// The spender's allowance cannot cover the transfer.
    #[error("insufficient allowance from {owner} to {spender}: have {allowance}, need {required}")]
    InsufficientAllowance {
        /// Account whose tokens are spent.
        owner: Address,
        /// Account spending them.
        spender: Address,
        /// Current allowance.
        allowance: Amount,
        /// Amount requested.
        required: Amount,
    },

    /// Only the minter may mint.
    #[error("{caller} is not the minter")]
    NotMinter {
        /// The rejected caller.
        caller: Address,
    },

    /// Minting would push total supply past the cap.
    #[error("minting {requested} would exceed max supply {max_supply} (current {total_supply})")]
    MaxSupplyExceeded {
        /// Supply cap.
        max_supply: Amount,
        /// Supply before the mint.
        total_supply: Amount,
        /// Amount requested.
        requested: Amount,
    },

    /// Transfers to or from the zero address are not allowed.
    #[error("zero address is not a valid {role}")]
    ZeroAddress {
        /// `"sender"` or `"recipient"`.
        role: &'static str,
    },

    /// A balance computation overflowed.
    #[error("token arithmetic overflow")]
    Overflow,
}

impl TokenError {
    /// Map onto the shared taxonomy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InsufficientBalance { .. } | Self::InsufficientAllowance { .. } => {
                ErrorCategory::External
            }
            Self::NotMinter { .. } => ErrorCategory::Authorization,
            Self::MaxSupplyExceeded { .. } => ErrorCategory::Threshold,
            Self::ZeroAddress { .. } => ErrorCategory::Integrity,
            Self::Overflow => ErrorCategory::Arithmetic,
        }
    }
}

/// Errors from the validity oracle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The oracle could not answer.
    #[error("validity oracle unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_is_external() {
        let err = TokenError::InsufficientBalance {
            account: Address::ZERO,
            balance: 1,
            required: 2,
        };
        assert_eq!(err.category(), ErrorCategory::External);
        assert!(err.to_string().contains("have 1, need 2"));
    }

    #[test]
    fn not_minter_is_authorization() {
        let err = TokenError::NotMinter {
            caller: Address::from_bytes([3; 20]),
        };
        assert_eq!(err.category(), ErrorCategory::Authorization);
    }
}
