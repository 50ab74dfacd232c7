//! # Consensus Rounds

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vouch_core::{Address, ProposalId, RoundId, Tick};
use vouch_crypto::VoteSignature;

use crate::config::QUORUM_PCT;

/// One accepted vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// `true` for approve.
    pub support: bool,
    /// The signature as submitted.
    pub signature: VoteSignature,
    /// Tick the vote was cast.
    pub cast_at: Tick,
}

/// A voting window over one challenged proposal.
///
/// Immutable once `finalized` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusRound {
    /// Round id.
    pub id: RoundId,
    /// The proposal being voted on.
    pub proposal_id: ProposalId,
    /// Tick the round opened.
    pub start_tick: Tick,
    /// Last tick at which votes are accepted.
    pub end_tick: Tick,
    /// Approve votes.
    pub votes_for: u64,
    /// Reject votes.
    pub votes_against: u64,
    /// Whether the round has been finalized.
    pub finalized: bool,
    /// Outcome, once finalized.
    pub approved: Option<bool>,
    /// Votes by voter.
    pub votes: BTreeMap<Address, VoteRecord>,
}

impl ConsensusRound {
    /// Whether `voter` has voted.
    pub fn has_voted(&self, voter: &Address) -> bool {
        self.votes.contains_key(voter)
    }

    /// Total votes cast.
    pub fn turnout(&self) -> u64 {
        self.votes_for.saturating_add(self.votes_against)
    }
}

/// Whether a round with these tallies passes against an active set of
/// `active_set_size` members.
pub fn consensus_outcome(votes_for: u64, votes_against: u64, active_set_size: usize) -> bool {
    let turnout = u128::from(votes_for) + u128::from(votes_against);
    let quorum = turnout * 100 >= active_set_size as u128 * u128::from(QUORUM_PCT);
    quorum && votes_for > votes_against
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn two_of_three_passes() {
        assert!(consensus_outcome(2, 0, 3));
    }

    #[test]
    fn one_of_three_fails_quorum() {
        assert!(!consensus_outcome(1, 0, 3));
    }

    #[test]
    fn quorum_boundary_is_inclusive() {
        // 3 of 5 is exactly 60%.
        assert!(consensus_outcome(3, 0, 5));
        assert!(consensus_outcome(2, 1, 5));
        assert!(!consensus_outcome(2, 0, 5));
    }

    #[test]
    fn tie_fails_even_with_quorum() {
        assert!(!consensus_outcome(2, 2, 4));
    }

    #[test]
    fn empty_active_set() {
        assert!(!consensus_outcome(0, 0, 0));
        assert!(consensus_outcome(1, 0, 0));
    }

    proptest! {
        #[test]
        fn matches_reference_formula(f in 0u64..1000, a in 0u64..1000, n in 0usize..2000) {
            let expected = (f + a) * 100 >= (n as u64) * 60 && f > a;
            prop_assert_eq!(consensus_outcome(f, a, n), expected);
        }

        #[test]
        fn never_overflows(f: u64, a: u64, n: usize) {
            let _ = consensus_outcome(f, a, n);
        }
    }
}
