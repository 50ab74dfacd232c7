//! # Re-entrancy Guard
//!
//! A single flag shared by every component of one protocol instance. A
//! mutating operation acquires a [`GuardScope`] on entry; the scope clears
//! the flag when dropped, so every exit path releases it, including early
//! returns through `?`.
//!
//! Any attempt to enter while a scope is alive fails with
//! [`ReentrancyError`]. Collaborators that call back into the protocol (a
//! token ledger with transfer hooks, for instance) therefore cannot start a
//! second mutation in the middle of the first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ReentrancyError;

/// Shared non-reentrant lock. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    locked: Arc<AtomicBool>,
}

impl ReentrancyGuard {
    /// Create an unlocked guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard for `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`ReentrancyError`] if another scope is still alive.
    pub fn enter(&self, operation: &'static str) -> Result<GuardScope, ReentrancyError> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            tracing::warn!(operation, "re-entrant call rejected");
            return Err(ReentrancyError { operation });
        }
        Ok(GuardScope {
            locked: Arc::clone(&self.locked),
        })
    }

    /// Whether a scope is currently alive.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

/// Proof that the guard is held. Releases on drop.
#[must_use = "the guard is released as soon as the scope is dropped"]
#[derive(Debug)]
pub struct GuardScope {
    locked: Arc<AtomicBool>,
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        self.locked.store(false, Ordering::Release);
    }
}
