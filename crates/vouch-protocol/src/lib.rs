//! # vouch-protocol — Protocol Facade
//!
//! Wires the four components into one deployment:
//!
//! - [`vouch_staking::StakeLedger`]: stake custody and active-set selection.
//! - [`vouch_proposal::ProposalStore`]: the proposal state machine.
//! - [`vouch_consensus::ConsensusEngine`]: signed votes on challenged
//!   proposals.
//! - [`vouch_dispute::DisputeGame`]: bonded disputes and slashing.
//!
//! [`Protocol`] drives them against a token ledger and tick clock under a
//! non-reentrant guard and keeps an ordered event log.
//! [`SharedProtocol`] serializes access from concurrent callers.
//! [`ProtocolConfig`] loads a deployment from YAML and `VOUCH_*` environment
//! variables.

pub mod config;
pub mod error;
pub mod protocol;
pub mod shared;

pub use config::{ConfigError, ProtocolConfig};
pub use error::ProtocolError;
pub use protocol::Protocol;
pub use shared::SharedProtocol;
