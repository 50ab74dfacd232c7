//! Per-call execution context.

use crate::identity::Address;
use crate::temporal::Tick;

/// Who is calling and at which tick.
///
/// Every mutating component operation takes a `CallContext`. Components
/// never read a clock or infer the caller themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The account invoking the operation.
    pub caller: Address,
    /// The current tick as seen by the surrounding ledger.
    pub now: Tick,
}

impl CallContext {
    /// Build a context for `caller` at `now`.
    pub fn new(caller: Address, now: Tick) -> Self {
        Self { caller, now }
    }
}
