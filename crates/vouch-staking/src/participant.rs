//! # Participant Records

use serde::{Deserialize, Serialize};
use vouch_core::{Address, Amount, Tick};

/// Where a participant stands in the staking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    /// No eligible stake. Reached at zero stake.
    Inactive,
    /// Stake at or above the minimum; eligible for the active set.
    Active,
    /// Entire stake requested for withdrawal.
    Unstaking,
    /// Slashed below the minimum but not to zero.
    Slashed,
}

impl ParticipantStatus {
    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "INACTIVE",
            Self::Active => "ACTIVE",
            Self::Unstaking => "UNSTAKING",
            Self::Slashed => "SLASHED",
        }
    }

    /// Whether a withdrawal may be requested from this status.
    pub fn can_withdraw(&self) -> bool {
        matches!(self, Self::Active | Self::Slashed)
    }
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stake removed from the active balance, waiting out the bonding period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingWithdrawal {
    /// Amount to release.
    pub amount: Amount,
    /// Tick of the request.
    pub requested_at: Tick,
}

/// One staker.
///
/// Created on first deposit, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant identity.
    pub address: Address,
    /// Active stake, excluding any pending withdrawal.
    pub stake: Amount,
    /// Lifecycle status.
    pub status: ParticipantStatus,
    /// Outstanding withdrawal, at most one.
    pub pending_withdrawal: Option<PendingWithdrawal>,
    /// Tick of first deposit.
    pub registered_at: Tick,
    /// Token account holding this participant's stake.
    pub stake_account: Address,
}

impl Participant {
    /// Eligible for the active set under `min_stake`.
    pub fn is_eligible(&self, min_stake: Amount) -> bool {
        self.status == ParticipantStatus::Active && self.stake >= min_stake
    }

    /// Stake plus pending withdrawal: what the stake account holds.
    pub fn custody(&self) -> Amount {
        self.stake
            .saturating_add(self.pending_withdrawal.map_or(0, |p| p.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(stake: Amount, status: ParticipantStatus) -> Participant {
        Participant {
            address: Address::from_bytes([1; 20]),
            stake,
            status,
            pending_withdrawal: None,
            registered_at: Tick::ZERO,
            stake_account: Address::from_bytes([2; 20]),
        }
    }

    #[test]
    fn eligibility_needs_status_and_stake() {
        assert!(participant(1000, ParticipantStatus::Active).is_eligible(1000));
        assert!(!participant(999, ParticipantStatus::Active).is_eligible(1000));
        assert!(!participant(5000, ParticipantStatus::Slashed).is_eligible(1000));
    }

    #[test]
    fn custody_includes_pending() {
        let mut p = participant(700, ParticipantStatus::Active);
        p.pending_withdrawal = Some(PendingWithdrawal {
            amount: 300,
            requested_at: Tick::new(4),
        });
        assert_eq!(p.custody(), 1000);
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&ParticipantStatus::Unstaking).unwrap();
        assert_eq!(json, "\"UNSTAKING\"");
    }
}
