//! # vouch-core — Foundational Types for the Vouch Protocol
//!
//! Every other crate in the workspace depends on `vouch-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `Address`, `ProposalId`,
//!    `RoundId`, `DisputeId` are distinct types. A `RoundId` cannot be passed
//!    where a `DisputeId` is expected, even though both are counters.
//!
//! 2. **Ticks, not wall-clock time.** Every window in the protocol (challenge
//!    window, voting window, bonding period) is measured in [`Tick`]s supplied
//!    by the caller through [`CallContext`]. Components never read a clock.
//!
//! 3. **One error taxonomy.** Each crate defines its own `thiserror` enum, and
//!    every variant maps onto an [`ErrorCategory`] so callers can branch on the
//!    kind of failure without matching on component-specific variants.
//!
//! 4. **Events are data.** Components append [`ProtocolEvent`]s to an
//!    [`EventBuffer`]; the protocol façade drains them after each operation.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vouch-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod access;
pub mod context;
pub mod error;
pub mod event;
pub mod guard;
pub mod hash;
pub mod hex;
pub mod identity;
pub mod temporal;

pub use access::{AccessControl, Role};
pub use context::CallContext;
pub use error::{AccessError, ErrorCategory, ReentrancyError, ValidationError};
pub use event::{EventBuffer, ProtocolEvent, VoteSubject};
pub use guard::{GuardScope, ReentrancyGuard};
pub use hash::ContentHash;
pub use identity::{Address, DisputeId, ProposalId, RoundId};
pub use temporal::Tick;

/// Token amount in the smallest unit of the staking token.
pub type Amount = u128;
