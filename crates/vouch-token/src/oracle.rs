//! # Validity Oracle
//!
//! An external, side-effect-free check of proposal content. The proposal
//! store records the answer as a flag; it never gates a transition on it.

use std::collections::BTreeMap;

use vouch_core::ContentHash;

use crate::error::OracleError;

/// Answers whether a content hash refers to valid content.
pub trait ValidityOracle {
    /// Check `content_hash`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Unavailable`] when no answer can be produced.
    fn check(&self, content_hash: &ContentHash) -> Result<bool, OracleError>;
}

/// Deterministic oracle: an explicit verdict table with a fallback.
#[derive(Debug, Clone)]
pub struct MockOracle {
    verdicts: BTreeMap<ContentHash, bool>,
    default_verdict: bool,
    available: bool,
}

impl MockOracle {
    /// An oracle answering `default_verdict` for every unknown hash.
    pub fn new(default_verdict: bool) -> Self {
        Self {
            verdicts: BTreeMap::new(),
            default_verdict,
            available: true,
        }
    }

    /// An oracle that always fails.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(false)
        }
    }

    /// Fix the verdict for one hash.
    pub fn set(&mut self, content_hash: ContentHash, valid: bool) {
        self.verdicts.insert(content_hash, valid);
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, content_hash: ContentHash, valid: bool) -> Self {
        self.set(content_hash, valid);
        self
    }

    /// Toggle availability.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ValidityOracle for MockOracle {
    fn check(&self, content_hash: &ContentHash) -> Result<bool, OracleError> {
        if !self.available {
            return Err(OracleError::Unavailable("mock oracle offline".to_string()));
        }
        Ok(self
            .verdicts
            .get(content_hash)
            .copied()
            .unwrap_or(self.default_verdict))
    }
}
