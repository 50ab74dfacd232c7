//! # Settlement Arithmetic
//!
//! Pure functions so the economics can be checked in isolation. Every
//! computation is checked; an overflow is a defect and surfaces as `None`.

use serde::{Deserialize, Serialize};
use vouch_core::Amount;

/// Whether the challenger carries the vote: at least half the active set
/// voted in favour of the challenge.
pub fn challenger_wins(votes_for: u64, active_set_size: usize) -> bool {
    u128::from(votes_for) * 2 >= active_set_size as u128
}

/// The slash for a dispute over `bond`.
///
/// `proposer_stake` is `Some(stake)` when the proposer is an active
/// participant, `None` otherwise (no slash at all).
pub fn compute_slash(bond: Amount, slash_pct: u8, proposer_stake: Option<Amount>) -> Option<Amount> {
    let Some(stake) = proposer_stake else {
        return Some(0);
    };
    let base = bond.checked_mul(Amount::from(slash_pct))? / 100;
    Some(base.min(stake))
}

/// Where the escrowed bond goes on resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Whether the challenger won.
    pub challenger_won: bool,
    /// Slash applied to the proposer (challenger win) or forfeited by the
    /// challenger (proposer win).
    pub slash_amount: Amount,
    /// Paid back to the challenger from escrow.
    pub challenger_payout: Amount,
    /// Paid to the treasury from escrow.
    pub treasury_payout: Amount,
}

impl Settlement {
    /// Split `bond` given the outcome and `slash`.
    ///
    /// `slash` is never larger than `bond` when `slash_pct ≤ 100`.
    pub fn split(bond: Amount, challenger_won: bool, slash: Amount) -> Option<Self> {
        if challenger_won {
            Some(Self {
                challenger_won,
                slash_amount: slash,
                challenger_payout: bond,
                treasury_payout: 0,
            })
        } else {
            Some(Self {
                challenger_won,
                slash_amount: slash,
                challenger_payout: bond.checked_sub(slash)?,
                treasury_payout: slash,
            })
        }
    }
}
