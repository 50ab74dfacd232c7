//! # vouch-proposal — Proposal Store
//!
//! Owns proposal records and drives their lifecycle:
//!
//! ```text
//!  Proposed ──approve_optimistically──▶ OptimisticApproved
//!     │                                   │         │
//!     │                     challenge     │         │ finalize
//!     │                  (≤ window end)   ▼         ▼ (> window end)
//!     │                             Challenged   Finalized
//!     │                                   │
//!     └──────────── reject ───────────────┴──▶ Rejected
//! ```
//!
//! Finalized and Rejected are terminal. Every transition is appended to the
//! proposal's transition log.
//!
//! The store reads the stake ledger to decide who may challenge or record an
//! approval, and never mutates it.

pub mod config;
pub mod error;
pub mod proposal;
pub mod store;

pub use config::ProposalConfig;
pub use error::ProposalError;
pub use proposal::{Proposal, ProposalState, TransitionRecord};
pub use store::ProposalStore;
