//! # vouch-staking — Stake Ledger
//!
//! Owns every participant's stake, status, and pending withdrawal, and
//! derives the **active set**: the highest-staked eligible participants,
//! ranked by stake descending with ties broken by registration order,
//! truncated to the configured limit.
//!
//! ## Lifecycle
//!
//! ```text
//!   deposit ≥ min            request (empties stake)
//!  ─────────────▶ Active ──────────────────────────▶ Unstaking
//!                  │  ▲                                  │
//!         slash    │  │ top-up ≥ min            complete │
//!      (< min)     ▼  │                                  ▼
//!                 Slashed ─── slash to zero ───────▶ Inactive
//! ```
//!
//! Stake is custodied at a per-participant stake account on the token
//! ledger. Custody always equals the participant's stake plus any pending
//! withdrawal; slashed tokens move to the treasury.
//!
//! The ledger never calls back into other protocol components.

pub mod active_set;
pub mod config;
pub mod error;
pub mod ledger;
pub mod participant;

pub use active_set::select_active_set;
pub use config::StakingConfig;
pub use error::StakingError;
pub use ledger::{StakeLedger, STAKE_ACCOUNT_DOMAIN};
pub use participant::{Participant, ParticipantStatus, PendingWithdrawal};
