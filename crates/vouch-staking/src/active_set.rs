//! # Active-Set Selection
//!
//! The active set is a pure function of the participant table:
//!
//! 1. Walk participants in registration order.
//! 2. Keep those with status Active and stake at or above the minimum.
//! 3. Stable-sort by stake descending, so equal stakes keep registration
//!    order.
//! 4. Truncate to the limit.
//!
//! The same participant table always yields the same sequence.

use std::cmp::Reverse;

use vouch_core::{Address, Amount};

use crate::participant::Participant;

/// Rank `participants` (given in registration order) into an active set of at
/// most `limit` members.
pub fn select_active_set<'a, I>(participants: I, min_stake: Amount, limit: usize) -> Vec<Address>
where
    I: IntoIterator<Item = &'a Participant>,
{
    let mut eligible: Vec<(Address, Amount)> = participants
        .into_iter()
        .filter(|p| p.is_eligible(min_stake))
        .map(|p| (p.address, p.stake))
        .collect();
    // `sort_by_key` is stable.
    eligible.sort_by_key(|(_, stake)| Reverse(*stake));
    eligible.truncate(limit);
    eligible.into_iter().map(|(address, _)| address).collect()
}
