//! # Temporal Types — Protocol Ticks
//!
//! All windows in the protocol are measured in ticks: a monotonically
//! increasing counter supplied by the surrounding ledger (block height in a
//! chain deployment, a manual counter in tests).
//!
//! ## Boundary Convention
//!
//! A window that "ends at tick `e`" is still open at `e` and closed at
//! `e + 1`. [`Tick::is_after`] is the strict comparison used for every
//! "strictly past the end" check.

use serde::{Deserialize, Serialize};

/// A point on the protocol's logical clock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tick(u64);

impl Tick {
    /// Tick zero.
    pub const ZERO: Tick = Tick(0);

    /// Wrap a raw tick value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw tick value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// `self + delta`, or `None` on overflow.
    pub fn checked_add(&self, delta: u64) -> Option<Tick> {
        self.0.checked_add(delta).map(Tick)
    }

    /// `self + delta`, clamped at `u64::MAX`.
    pub fn saturating_add(&self, delta: u64) -> Tick {
        Tick(self.0.saturating_add(delta))
    }

    /// Ticks elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn saturating_since(&self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Whether `self` is strictly past `deadline`.
    pub fn is_after(&self, deadline: Tick) -> bool {
        self.0 > deadline.0
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}
