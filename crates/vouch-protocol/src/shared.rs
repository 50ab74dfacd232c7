//! # Shared Protocol Handle
//!
//! Independent callers (threads, request handlers) share one protocol
//! instance through [`SharedProtocol`]. Each call takes the lock for the whole
//! operation, so operations are admitted one at a time in lock order and
//! every operation observes the complete effects of the previous one.
//!
//! `parking_lot::Mutex` does not poison: a panicking caller releases the
//! lock without marking the instance unusable.

use std::sync::Arc;

use parking_lot::Mutex;
use vouch_token::MockOracle;

use crate::protocol::Protocol;

/// Cloneable, thread-safe handle on one [`Protocol`].
#[derive(Debug)]
pub struct SharedProtocol<T, O = MockOracle> {
    inner: Arc<Mutex<Protocol<T, O>>>,
}

impl<T, O> Clone for SharedProtocol<T, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, O> SharedProtocol<T, O> {
    /// Wrap a protocol instance.
    pub fn new(protocol: Protocol<T, O>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(protocol)),
        }
    }

    /// Run `f` with exclusive access. Everything `f` does is one serialized
    /// step from the point of view of other handles.
    pub fn with<R>(&self, f: impl FnOnce(&mut Protocol<T, O>) -> R) -> R {
        let mut protocol = self.inner.lock();
        f(&mut protocol)
    }

    /// Run `f` against a consistent snapshot.
    pub fn read<R>(&self, f: impl FnOnce(&Protocol<T, O>) -> R) -> R {
        let protocol = self.inner.lock();
        f(&protocol)
    }
}
