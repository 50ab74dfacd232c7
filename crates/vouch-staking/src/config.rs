//! # Staking Configuration

use serde::{Deserialize, Serialize};
use vouch_core::Amount;

/// Tunable stake ledger parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    /// Minimum stake for registration and active-set eligibility.
    pub min_stake: Amount,
    /// Maximum number of participants in the active set.
    pub max_active_validators: usize,
    /// Ticks between a withdrawal request and its completion.
    pub bonding_period: u64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            min_stake: 1_000,
            max_active_validators: 100,
            bonding_period: 100,
        }
    }
}

impl StakingConfig {
    /// Reject parameters the ledger cannot operate under.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_stake == 0 {
            return Err("min_stake must be greater than zero".to_string());
        }
        if self.max_active_validators == 0 {
            return Err("max_active_validators must be greater than zero".to_string());
        }
        Ok(())
    }
}
