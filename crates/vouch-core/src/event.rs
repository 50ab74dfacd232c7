//! # Protocol Events
//!
//! Every mutating operation records what it did as one or more
//! [`ProtocolEvent`]s carrying the identities and amounts involved, so an
//! external auditor can replay the ledger's effects from the event stream
//! alone.
//!
//! Components buffer events in an [`EventBuffer`]; the protocol façade drains
//! each component's buffer once an operation has fully succeeded.

use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::hash::ContentHash;
use crate::identity::{Address, DisputeId, ProposalId, RoundId};
use crate::temporal::Tick;
use crate::Amount;

/// What a signed vote was cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteSubject {
    /// A consensus round.
    Round(RoundId),
    /// A dispute game.
    Dispute(DisputeId),
}

impl std::fmt::Display for VoteSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Round(id) => write!(f, "{id}"),
            Self::Dispute(id) => write!(f, "{id}"),
        }
    }
}

/// An observable side effect of a successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    /// A participant deposited for the first time.
    ParticipantRegistered {
        participant: Address,
        amount: Amount,
        stake_account: Address,
    },
    /// An existing participant added stake.
    StakeIncreased {
        participant: Address,
        amount: Amount,
        new_stake: Amount,
    },
    /// A participant asked to withdraw stake.
    WithdrawalRequested {
        participant: Address,
        amount: Amount,
        available_at: Tick,
    },
    /// A pending withdrawal was paid out.
    WithdrawalCompleted { participant: Address, amount: Amount },
    /// Stake was forcibly reduced.
    Slashed {
        participant: Address,
        requested: Amount,
        applied: Amount,
        reason: String,
    },
    /// Active-set membership or ranking changed.
    ActiveSetUpdated { members: Vec<Address> },
    /// A proposal was submitted.
    ProposalCreated {
        proposal_id: ProposalId,
        proposer: Address,
        content_hash: ContentHash,
    },
    /// A proposal was optimistically approved and its challenge window opened.
    ProposalApproved {
        proposal_id: ProposalId,
        challenge_window_end: Tick,
    },
    /// A proposal was challenged within its window.
    ProposalChallenged {
        proposal_id: ProposalId,
        challenger: Address,
    },
    /// A proposal passed its challenge window unchallenged.
    ProposalFinalized { proposal_id: ProposalId },
    /// A proposal was rejected.
    ProposalRejected {
        proposal_id: ProposalId,
        reason: String,
    },
    /// A validator recorded approval of a proposal.
    ApprovalRecorded {
        proposal_id: ProposalId,
        participant: Address,
        approvals: u64,
    },
    /// The validity oracle answered for a proposal.
    OracleChecked { proposal_id: ProposalId, valid: bool },
    /// A consensus round opened.
    RoundOpened {
        round_id: RoundId,
        proposal_id: ProposalId,
        end_tick: Tick,
    },
    /// A signed vote was accepted.
    VoteCast {
        subject: VoteSubject,
        voter: Address,
        support: bool,
    },
    /// A consensus round was finalized.
    RoundFinalized {
        round_id: RoundId,
        proposal_id: ProposalId,
        approved: bool,
        votes_for: u64,
        votes_against: u64,
    },
    /// A dispute was opened and its bond escrowed.
    DisputeOpened {
        dispute_id: DisputeId,
        proposal_id: ProposalId,
        challenger: Address,
        bond: Amount,
    },
    /// A dispute was resolved.
    DisputeResolved {
        dispute_id: DisputeId,
        challenger_won: bool,
        slash_amount: Amount,
    },
    /// A dispute was cancelled and its bond refunded.
    DisputeCancelled {
        dispute_id: DisputeId,
        reason: String,
    },
    /// Tokens were paid out as the result of a dispute.
    RewardDistributed {
        dispute_id: DisputeId,
        recipient: Address,
        amount: Amount,
    },
    /// A role was granted.
    RoleGranted { role: Role, account: Address },
    /// A role was revoked.
    RoleRevoked { role: Role, account: Address },
}

impl ProtocolEvent {
    /// Short machine name of the event kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ParticipantRegistered { .. } => "participant_registered",
            Self::StakeIncreased { .. } => "stake_increased",
            Self::WithdrawalRequested { .. } => "withdrawal_requested",
            Self::WithdrawalCompleted { .. } => "withdrawal_completed",
            Self::Slashed { .. } => "slashed",
            Self::ActiveSetUpdated { .. } => "active_set_updated",
            Self::ProposalCreated { .. } => "proposal_created",
            Self::ProposalApproved { .. } => "proposal_approved",
            Self::ProposalChallenged { .. } => "proposal_challenged",
            Self::ProposalFinalized { .. } => "proposal_finalized",
            Self::ProposalRejected { .. } => "proposal_rejected",
            Self::ApprovalRecorded { .. } => "approval_recorded",
            Self::OracleChecked { .. } => "oracle_checked",
            Self::RoundOpened { .. } => "round_opened",
            Self::VoteCast { .. } => "vote_cast",
            Self::RoundFinalized { .. } => "round_finalized",
            Self::DisputeOpened { .. } => "dispute_opened",
            Self::DisputeResolved { .. } => "dispute_resolved",
            Self::DisputeCancelled { .. } => "dispute_cancelled",
            Self::RewardDistributed { .. } => "reward_distributed",
            Self::RoleGranted { .. } => "role_granted",
            Self::RoleRevoked { .. } => "role_revoked",
        }
    }
}

/// Append-only buffer of events produced by one component.
#[derive(Debug, Clone, Default)]
pub struct EventBuffer {
    events: Vec<ProtocolEvent>,
}

impl EventBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event.
    pub fn emit(&mut self, event: ProtocolEvent) {
        tracing::info!(event = event.name(), ?event, "protocol event");
        self.events.push(event);
    }

    /// Events recorded since the last drain.
    pub fn pending(&self) -> &[ProtocolEvent] {
        &self.events
    }

    /// Take all buffered events, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<ProtocolEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop events recorded after `mark`, used to discard the effects of an
    /// operation that failed after emitting.
    pub fn truncate(&mut self, mark: usize) {
        self.events.truncate(mark);
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
