//! # Proposal Records and States

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use vouch_core::{Address, ContentHash, ProposalId, Tick};

use crate::error::ProposalError;

/// Lifecycle state of a proposal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalState {
    /// Submitted, awaiting optimistic approval.
    Proposed,
    /// Approved; the challenge window is running.
    OptimisticApproved,
    /// Contested within the window.
    Challenged,
    /// Passed the window unchallenged. Terminal.
    Finalized,
    /// Rejected by an operator. Terminal.
    Rejected,
}

impl ProposalState {
    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposed => "PROPOSED",
            Self::OptimisticApproved => "OPTIMISTIC_APPROVED",
            Self::Challenged => "CHALLENGED",
            Self::Finalized => "FINALIZED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Whether no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Rejected)
    }

    /// Valid target states from this state.
    pub fn valid_transitions(&self) -> &'static [ProposalState] {
        match self {
            Self::Proposed => &[Self::OptimisticApproved, Self::Rejected],
            Self::OptimisticApproved => &[Self::Challenged, Self::Finalized, Self::Rejected],
            Self::Challenged => &[Self::Rejected],
            Self::Finalized | Self::Rejected => &[],
        }
    }

    /// Whether validator approvals may still be recorded.
    pub fn accepts_approvals(&self) -> bool {
        matches!(self, Self::Proposed | Self::OptimisticApproved)
    }
}

impl std::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a proposal's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before the transition.
    pub from_state: ProposalState,
    /// State after the transition.
    pub to_state: ProposalState,
    /// Tick at which it happened.
    pub tick: Tick,
    /// Who triggered it.
    pub actor: Address,
    /// Free-form reason; empty for routine transitions.
    pub reason: String,
}

/// A submitted proposal.
///
/// ## Security Invariant
///
/// `state` only changes through [`Proposal::transition`], which refuses any
/// move not listed in [`ProposalState::valid_transitions`] and appends every
/// accepted move to `transition_log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposal id.
    pub id: ProposalId,
    /// Submitter.
    pub proposer: Address,
    /// Fingerprint of the proposed content. Never zero.
    pub content_hash: ContentHash,
    /// Opaque metadata. Never empty.
    pub metadata: Vec<u8>,
    /// Current lifecycle state.
    pub state: ProposalState,
    /// Submission tick.
    pub created_at: Tick,
    /// Last tick at which a challenge is accepted. Set on optimistic
    /// approval.
    pub challenge_window_end: Option<Tick>,
    /// Who challenged, once challenged.
    pub challenger: Option<Address>,
    /// Number of recorded validator approvals.
    pub approvals: u64,
    /// Validators that recorded an approval.
    pub approved_by: BTreeSet<Address>,
    /// Last answer of the validity oracle.
    pub oracle_validated: bool,
    /// Every transition, in order.
    pub transition_log: Vec<TransitionRecord>,
}

impl Proposal {
    /// Whether a challenge at `now` would be accepted.
    pub fn is_challengeable_at(&self, now: Tick) -> bool {
        self.state == ProposalState::OptimisticApproved
            && self.challenge_window_end.is_some_and(|end| !now.is_after(end))
    }

    pub(crate) fn transition(
        &mut self,
        to: ProposalState,
        tick: Tick,
        actor: Address,
        reason: impl Into<String>,
    ) -> Result<ProposalState, ProposalError> {
        let from = self.state;
        if !from.valid_transitions().contains(&to) {
            return Err(ProposalError::InvalidStateTransition {
                id: self.id,
                from,
                to,
            });
        }
        self.transition_log.push(TransitionRecord {
            from_state: from,
            to_state: to,
            tick,
            actor,
            reason: reason.into(),
        });
        self.state = to;
        Ok(from)
    }
}
