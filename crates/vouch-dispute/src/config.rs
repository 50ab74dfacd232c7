//! # Dispute Game Configuration

use serde::{Deserialize, Serialize};
use vouch_core::Amount;

/// Tunable dispute parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisputeConfig {
    /// Smallest accepted bond.
    pub min_bond: Amount,
    /// Share of the bond used as the slash amount, in percent.
    pub slash_pct: u8,
    /// Length of a dispute's voting window in ticks.
    pub voting_period: u64,
}

impl Default for DisputeConfig {
    fn default() -> Self {
        Self {
            min_bond: 100,
            slash_pct: 10,
            voting_period: 100,
        }
    }
}

impl DisputeConfig {
    /// Reject parameters the game cannot settle under.
    pub fn validate(&self) -> Result<(), String> {
        if self.slash_pct > 100 {
            return Err(format!("slash_pct {} exceeds 100", self.slash_pct));
        }
        Ok(())
    }
}
