//! # Dispute Records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vouch_core::{Address, Amount, DisputeId, ProposalId, Tick};
use vouch_crypto::VoteSignature;

/// Lifecycle state of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeState {
    /// Taking votes.
    Active,
    /// Tallied, settlement in progress.
    VotingComplete,
    /// Settled. Terminal.
    Resolved,
    /// Cancelled by an operator, bond refunded. Terminal.
    Cancelled,
}

impl DisputeState {
    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::VotingComplete => "VOTING_COMPLETE",
            Self::Resolved => "RESOLVED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled)
    }

    /// Valid target states from this state.
    pub fn valid_transitions(&self) -> &'static [DisputeState] {
        match self {
            Self::Active => &[Self::VotingComplete, Self::Cancelled],
            Self::VotingComplete => &[Self::Resolved],
            Self::Resolved | Self::Cancelled => &[],
        }
    }
}

impl std::fmt::Display for DisputeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted dispute vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeVote {
    /// `true` supports the challenger.
    pub support: bool,
    /// The signature as submitted.
    pub signature: VoteSignature,
    /// Tick the vote was cast.
    pub cast_at: Tick,
}

/// One entry in a dispute's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeTransition {
    /// State before.
    pub from_state: DisputeState,
    /// State after.
    pub to_state: DisputeState,
    /// Tick of the transition.
    pub tick: Tick,
    /// Free-form reason.
    pub reason: String,
}

/// A bonded challenge against one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    /// Dispute id.
    pub id: DisputeId,
    /// The contested proposal.
    pub proposal_id: ProposalId,
    /// Who posted the bond.
    pub challenger: Address,
    /// The proposal's proposer when the dispute opened.
    pub proposer: Address,
    /// Escrowed bond.
    pub bond: Amount,
    /// Current lifecycle state.
    pub state: DisputeState,
    /// Tick the dispute opened.
    pub created_at: Tick,
    /// Last tick at which votes are accepted.
    pub voting_end: Tick,
    /// Votes for the challenger.
    pub votes_for: u64,
    /// Votes against the challenger.
    pub votes_against: u64,
    /// Outcome, once resolved.
    pub challenger_won: Option<bool>,
    /// Slash actually applied to the proposer (challenger win) or forfeited
    /// from the bond (proposer win).
    pub slash_amount: Amount,
    /// Votes by voter.
    pub votes: BTreeMap<Address, DisputeVote>,
    /// Every transition, in order.
    pub transition_log: Vec<DisputeTransition>,
}

impl Dispute {
    /// Whether `voter` has voted.
    pub fn has_voted(&self, voter: &Address) -> bool {
        self.votes.contains_key(voter)
    }

    /// Move to `to`, appending to the log. Returns `false` (and changes
    /// nothing) if the move is not allowed from the current state.
    pub(crate) fn transition(&mut self, to: DisputeState, tick: Tick, reason: &str) -> bool {
        if !self.state.valid_transitions().contains(&to) {
            return false;
        }
        self.transition_log.push(DisputeTransition {
            from_state: self.state,
            to_state: to,
            tick,
            reason: reason.to_string(),
        });
        tracing::info!(dispute_id = %self.id, from = %self.state, %to, "dispute transition");
        self.state = to;
        true
    }
}
