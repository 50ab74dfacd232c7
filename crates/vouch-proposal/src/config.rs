//! # Proposal Store Configuration

use serde::{Deserialize, Serialize};

/// Tunable proposal store parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalConfig {
    /// Ticks after optimistic approval during which a proposal may be
    /// challenged. The window end itself is still open.
    pub challenge_window: u64,
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            challenge_window: 100,
        }
    }
}
