//! # Protocol Configuration
//!
//! One YAML document configures a whole deployment:
//!
//! ```yaml
//! chain_id: 31337
//! admin: "0xadadadadadadadadadadadadadadadadadadadad"
//! treasury: "0x7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e"
//! staking:
//!   min_stake: 1000
//!   max_active_validators: 100
//!   bonding_period: 100
//! proposal:
//!   challenge_window: 100
//! dispute:
//!   min_bond: 100
//!   slash_pct: 10
//!   voting_period: 100
//! ```
//!
//! Omitted sections take their defaults. Component identities
//! (`staking_address`, `consensus_address`, `dispute_address`) default to
//! fixed derived addresses.
//!
//! ## Environment overrides
//!
//! [`ProtocolConfig::from_env`] reads the file named by `VOUCH_CONFIG` (or
//! starts from defaults) and then applies:
//!
//! - `VOUCH_CHAIN_ID`
//! - `VOUCH_ADMIN`, `VOUCH_TREASURY`
//! - `VOUCH_MIN_STAKE`, `VOUCH_MAX_ACTIVE_VALIDATORS`, `VOUCH_BONDING_PERIOD`
//! - `VOUCH_CHALLENGE_WINDOW`
//! - `VOUCH_MIN_BOND`, `VOUCH_SLASH_PCT`, `VOUCH_DISPUTE_VOTING_PERIOD`

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vouch_consensus::ConsensusConfig;
use vouch_core::Address;
use vouch_crypto::derive_address;
use vouch_dispute::DisputeConfig;
use vouch_proposal::ProposalConfig;
use vouch_staking::StakingConfig;

/// Domain tag for the default component addresses.
const DEPLOYMENT_DOMAIN: &[u8] = b"vouch.deployment";

/// Complete deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Network identity bound into signed votes.
    pub chain_id: u64,
    /// Administrator of every component.
    pub admin: Address,
    /// Receives slashed stake and forfeited bond shares.
    pub treasury: Address,
    /// Stake ledger identity.
    pub staking_address: Address,
    /// Consensus engine identity, the verifying contract for round votes.
    pub consensus_address: Address,
    /// Dispute game identity, escrow account, and verifying contract for
    /// dispute votes.
    pub dispute_address: Address,
    /// Stake ledger parameters.
    pub staking: StakingConfig,
    /// Proposal store parameters.
    pub proposal: ProposalConfig,
    /// Dispute game parameters.
    pub dispute: DisputeConfig,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            admin: Address::ZERO,
            treasury: Address::ZERO,
            staking_address: derive_address(DEPLOYMENT_DOMAIN, &[b"staking"]),
            consensus_address: derive_address(DEPLOYMENT_DOMAIN, &[b"consensus"]),
            dispute_address: derive_address(DEPLOYMENT_DOMAIN, &[b"dispute"]),
            staking: StakingConfig::default(),
            proposal: ProposalConfig::default(),
            dispute: DisputeConfig::default(),
        }
    }
}

impl ProtocolConfig {
    /// Defaults with the given admin and treasury.
    pub fn new(admin: Address, treasury: Address) -> Self {
        Self {
            admin,
            treasury,
            ..Self::default()
        }
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::YamlParse {
            path: None,
            reason: e.to_string(),
        })
    }

    /// Read and parse a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
            path: Some(path.to_path_buf()),
            reason: e.to_string(),
        })
    }

    /// Load from `VOUCH_CONFIG` (if set), apply `VOUCH_*` overrides, and
    /// validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("VOUCH_CONFIG") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        tracing::info!(
            chain_id = config.chain_id,
            admin = %config.admin,
            treasury = %config.treasury,
            "protocol configuration loaded"
        );
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value when set.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_with(&lookup, "VOUCH_CHAIN_ID", &mut self.chain_id)?;
        override_with(&lookup, "VOUCH_ADMIN", &mut self.admin)?;
        override_with(&lookup, "VOUCH_TREASURY", &mut self.treasury)?;
        override_with(&lookup, "VOUCH_MIN_STAKE", &mut self.staking.min_stake)?;
        override_with(
            &lookup,
            "VOUCH_MAX_ACTIVE_VALIDATORS",
            &mut self.staking.max_active_validators,
        )?;
        override_with(&lookup, "VOUCH_BONDING_PERIOD", &mut self.staking.bonding_period)?;
        override_with(
            &lookup,
            "VOUCH_CHALLENGE_WINDOW",
            &mut self.proposal.challenge_window,
        )?;
        override_with(&lookup, "VOUCH_MIN_BOND", &mut self.dispute.min_bond)?;
        override_with(&lookup, "VOUCH_SLASH_PCT", &mut self.dispute.slash_pct)?;
        override_with(
            &lookup,
            "VOUCH_DISPUTE_VOTING_PERIOD",
            &mut self.dispute.voting_period,
        )?;
        Ok(())
    }

    /// Reject configurations the protocol cannot run under.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.is_zero() {
            return Err(ConfigError::Invalid("admin must be set".to_string()));
        }
        if self.treasury.is_zero() {
            return Err(ConfigError::Invalid("treasury must be set".to_string()));
        }
        let identities = [
            self.staking_address,
            self.consensus_address,
            self.dispute_address,
        ];
        if identities.iter().any(Address::is_zero) {
            return Err(ConfigError::Invalid(
                "component addresses must be non-zero".to_string(),
            ));
        }
        if identities[0] == identities[1]
            || identities[0] == identities[2]
            || identities[1] == identities[2]
        {
            return Err(ConfigError::Invalid(
                "component addresses must be distinct".to_string(),
            ));
        }
        self.staking.validate().map_err(ConfigError::Invalid)?;
        self.dispute.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// The consensus engine's vote domain.
    pub fn consensus(&self) -> ConsensusConfig {
        ConsensusConfig {
            verifying_contract: self.consensus_address,
            chain_id: self.chain_id,
        }
    }
}

fn override_with<F, V>(lookup: &F, var: &'static str, slot: &mut V) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    V: FromStr,
    V::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(var) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e: V::Err| ConfigError::InvalidEnv {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {reason}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        reason: String,
    },

    /// The document is not valid YAML for this schema.
    #[error("invalid YAML: {reason}")]
    YamlParse {
        /// File that failed, when loaded from disk.
        path: Option<PathBuf>,
        /// Parser message.
        reason: String,
    },

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Parse error.
        reason: String,
    },

    /// The configuration parsed but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const ADMIN: Address = Address::from_bytes([0xad; 20]);
    const TREASURY: Address = Address::from_bytes([0x7e; 20]);

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn defaults_need_admin_and_treasury() {
        assert!(ProtocolConfig::default().validate().is_err());
        assert!(ProtocolConfig::new(ADMIN, TREASURY).validate().is_ok());
    }

    #[test]
    fn default_component_addresses_are_distinct() {
        let config = ProtocolConfig::default();
        assert_ne!(config.staking_address, config.consensus_address);
        assert_ne!(config.consensus_address, config.dispute_address);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = r#"
admin: "0xadadadadadadadadadadadadadadadadadadadad"
treasury: "0x7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e7e"
staking:
  min_stake: 500
dispute:
  slash_pct: 25
"#;
        let config = ProtocolConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.admin, ADMIN);
        assert_eq!(config.staking.min_stake, 500);
        assert_eq!(config.staking.bonding_period, 100);
        assert_eq!(config.dispute.slash_pct, 25);
        assert_eq!(config.dispute.min_bond, 100);
        assert_eq!(config.proposal.challenge_window, 100);
        assert_eq!(config.chain_id, 31337);
        config.validate().unwrap();
    }

    #[test]
    fn malformed_address_is_a_parse_error() {
        let err = ProtocolConfig::from_yaml_str("admin: \"0x1234\"").unwrap_err();
        assert!(matches!(err, ConfigError::YamlParse { path: None, .. }));
    }

    #[test]
    fn overrides_apply_on_top_of_file_values() {
        let mut config = ProtocolConfig::new(ADMIN, TREASURY);
        config
            .apply_overrides(env(&[
                ("VOUCH_CHAIN_ID", "1"),
                ("VOUCH_MIN_STAKE", " 2500 "),
                ("VOUCH_SLASH_PCT", "15"),
                ("VOUCH_TREASURY", "0x0101010101010101010101010101010101010101"),
            ]))
            .unwrap();
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.staking.min_stake, 2500);
        assert_eq!(config.dispute.slash_pct, 15);
        assert_eq!(config.treasury, Address::from_bytes([1; 20]));
        assert_eq!(config.admin, ADMIN);
    }

    #[test]
    fn bad_override_names_the_variable() {
        let mut config = ProtocolConfig::new(ADMIN, TREASURY);
        let err = config
            .apply_overrides(env(&[("VOUCH_SLASH_PCT", "ten")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: "VOUCH_SLASH_PCT",
                ..
            }
        ));
    }

    #[test]
    fn validation_limits() {
        let mut config = ProtocolConfig::new(ADMIN, TREASURY);
        config.dispute.slash_pct = 101;
        assert!(config.validate().is_err());

        let mut config = ProtocolConfig::new(ADMIN, TREASURY);
        config.staking.min_stake = 0;
        assert!(config.validate().is_err());

        let mut config = ProtocolConfig::new(ADMIN, TREASURY);
        config.dispute_address = config.staking_address;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ProtocolConfig::load(Path::new("/nonexistent/vouch.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn yaml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vouch.yaml");
        let config = ProtocolConfig::new(ADMIN, TREASURY);
        std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();
        assert_eq!(ProtocolConfig::load(&path).unwrap(), config);
    }
}
