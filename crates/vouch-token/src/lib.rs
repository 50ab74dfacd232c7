//! # vouch-token — External Collaborators
//!
//! The protocol core never owns funds or judges content itself. It talks to
//! two collaborators through narrow traits:
//!
//! - [`TokenLedger`]: balances, allowances, and transfers of the staking
//!   token. Every failure propagates as a hard failure of the calling
//!   protocol operation.
//! - [`ValidityOracle`]: a pure `content hash -> bool` check. Its
//!   unavailability never blocks a state transition.
//!
//! [`InMemoryToken`] and [`MockOracle`] are the deterministic
//! implementations used by the protocol façade and its tests.

pub mod error;
pub mod ledger;
pub mod memory;
pub mod oracle;

pub use error::{OracleError, TokenError};
pub use ledger::TokenLedger;
pub use memory::InMemoryToken;
pub use oracle::{MockOracle, ValidityOracle};
