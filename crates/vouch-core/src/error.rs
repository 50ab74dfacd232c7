//! # Error Types — Shared Taxonomy
//!
//! Every component crate defines its own `thiserror` enum. Each of those
//! variants maps onto one [`ErrorCategory`], giving callers a uniform way to
//! tell an authorization failure from a timing failure without knowing which
//! component raised it.
//!
//! ## Design
//!
//! - Failures are surfaced synchronously and never retried internally.
//! - Operations are all-or-nothing: an error means no state was changed.
//! - Arithmetic overflow is reported as [`ErrorCategory::Arithmetic`]; it
//!   indicates a defect, not a recoverable condition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::Role;
use crate::identity::Address;

/// The kind of failure, independent of the component that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Caller lacks the required role or membership.
    Authorization,
    /// Operation attempted from a state that does not permit it.
    InvalidState,
    /// Amount below a minimum, above an available balance, or leaving a
    /// disallowed partial state.
    Threshold,
    /// Window not open, already closed, or bonding period unmet.
    Timing,
    /// Malformed input, duplicate action, or signature failure.
    Integrity,
    /// Reference to a nonexistent record.
    NotFound,
    /// Checked arithmetic overflowed.
    Arithmetic,
    /// Failure reported by an external collaborator (token ledger).
    External,
}

impl ErrorCategory {
    /// The canonical string name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "AUTHORIZATION",
            Self::InvalidState => "INVALID_STATE",
            Self::Threshold => "THRESHOLD",
            Self::Timing => "TIMING",
            Self::Integrity => "INTEGRITY",
            Self::NotFound => "NOT_FOUND",
            Self::Arithmetic => "ARITHMETIC",
            Self::External => "EXTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from parsing or validating primitive values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input is not valid hex.
    #[error("invalid hex string: {0:?}")]
    InvalidHex(String),

    /// Decoded byte length does not match the expected width.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },
}

/// Caller is not permitted to perform a role-gated action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Caller does not hold the role.
    #[error("{caller} lacks role {role}")]
    MissingRole {
        /// The caller that was rejected.
        caller: Address,
        /// The role that was required.
        role: Role,
    },

    /// Only the admin may manage roles.
    #[error("{caller} is not the admin")]
    NotAdmin {
        /// The caller that was rejected.
        caller: Address,
    },
}

/// A mutating operation was invoked while another was still in progress.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("re-entrant call to {operation} rejected")]
pub struct ReentrancyError {
    /// The operation that attempted to enter.
    pub operation: &'static str,
}
