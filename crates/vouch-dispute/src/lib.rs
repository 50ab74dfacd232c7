//! # vouch-dispute — Dispute Game
//!
//! Any active participant may post a bond to contest an optimistically
//! approved proposal while its challenge window is open. The active set then
//! votes with signed messages; once the dispute's own window has closed it is
//! resolved:
//!
//! - **Challenger wins** iff `votes_for * 2 >= active_set_size`. The
//!   proposer is slashed and the full bond is refunded.
//! - **Proposer wins** otherwise. The challenger forfeits the slash amount to
//!   the treasury and receives the rest of the bond.
//!
//! In both cases `slash = bond * slash_pct / 100`, capped at the proposer's
//! stake when the proposer is an active participant, and zero when the
//! proposer is not.
//!
//! ```text
//!  Active ──resolve──▶ VotingComplete ──▶ Resolved
//!    │
//!    └──cancel──▶ Cancelled
//! ```
//!
//! Opening a dispute does not change the proposal's state, and several
//! disputes may run against the same proposal at once.

pub mod config;
pub mod dispute;
pub mod error;
pub mod game;
pub mod outcome;

pub use config::DisputeConfig;
pub use dispute::{Dispute, DisputeState, DisputeTransition, DisputeVote};
pub use error::DisputeError;
pub use game::DisputeGame;
pub use outcome::{challenger_wins, compute_slash, Settlement};
