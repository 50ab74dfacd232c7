//! # vouch-consensus — Consensus Round Engine
//!
//! Opens a fixed-length voting window for a challenged proposal, collects
//! one signed yes/no vote per active-set member, and finalizes the round
//! once the window has closed:
//!
//! ```text
//! approved = (votes_for + votes_against) * 100 >= active_set_size * QUORUM_PCT
//!            && votes_for > votes_against
//! ```
//!
//! `active_set_size` is read when the round is finalized, not when it opens.
//!
//! Finalizing a round reports the outcome; it does not move the proposal.
//! At most one unfinalized round exists per proposal.

pub mod config;
pub mod engine;
pub mod error;
pub mod round;

pub use config::{ConsensusConfig, QUORUM_PCT, VOTING_PERIOD};
pub use engine::ConsensusEngine;
pub use error::ConsensusError;
pub use round::{consensus_outcome, ConsensusRound, VoteRecord};
