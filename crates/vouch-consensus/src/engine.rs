//! # Consensus Engine
//!
//! Round lifecycle: `open_round` (operator, challenged proposal, no other
//! open round for it) → `cast_vote` (active-set members, once each, within
//! the window) → `finalize` (anyone, strictly after the window).

use std::collections::BTreeMap;

use vouch_core::{
    AccessControl, Address, CallContext, EventBuffer, ProposalId, ProtocolEvent, Role, RoundId,
    VoteSubject,
};
use vouch_crypto::{verify_vote, VoteMessage, VoteSignature};
use vouch_proposal::{ProposalState, ProposalStore};
use vouch_staking::StakeLedger;

use crate::config::{ConsensusConfig, VOTING_PERIOD};
use crate::error::ConsensusError;
use crate::round::{consensus_outcome, ConsensusRound, VoteRecord};

/// Consensus rounds over challenged proposals.
#[derive(Debug, Clone)]
pub struct ConsensusEngine {
    config: ConsensusConfig,
    access: AccessControl,
    next_id: RoundId,
    rounds: BTreeMap<RoundId, ConsensusRound>,
    by_proposal: BTreeMap<ProposalId, Vec<RoundId>>,
    open_rounds: BTreeMap<ProposalId, RoundId>,
    events: EventBuffer,
}

impl ConsensusEngine {
    /// Create an engine administered by `admin`.
    pub fn new(admin: Address, config: ConsensusConfig) -> Self {
        Self {
            config,
            access: AccessControl::new(admin),
            next_id: RoundId::FIRST,
            rounds: BTreeMap::new(),
            by_proposal: BTreeMap::new(),
            open_rounds: BTreeMap::new(),
            events: EventBuffer::new(),
        }
    }

    /// Open a voting round for a challenged proposal. Operator only.
    pub fn open_round(
        &mut self,
        ctx: &CallContext,
        proposals: &ProposalStore,
        proposal_id: ProposalId,
    ) -> Result<RoundId, ConsensusError> {
        self.access.require(Role::Operator, &ctx.caller)?;
        let proposal = proposals
            .proposal(proposal_id)
            .ok_or(ConsensusError::ProposalNotFound { proposal_id })?;
        if proposal.state != ProposalState::Challenged {
            return Err(ConsensusError::NotChallenged {
                proposal_id,
                state: proposal.state,
            });
        }
        if let Some(round_id) = self.open_rounds.get(&proposal_id) {
            return Err(ConsensusError::AlreadyInConsensus {
                proposal_id,
                round_id: *round_id,
            });
        }
        let id = self.next_id;
        let next_id = id.checked_next().ok_or(ConsensusError::Overflow)?;
        let end_tick = ctx
            .now
            .checked_add(VOTING_PERIOD)
            .ok_or(ConsensusError::Overflow)?;

        self.next_id = next_id;
        self.rounds.insert(
            id,
            ConsensusRound {
                id,
                proposal_id,
                start_tick: ctx.now,
                end_tick,
                votes_for: 0,
                votes_against: 0,
                finalized: false,
                approved: None,
                votes: BTreeMap::new(),
            },
        );
        self.by_proposal.entry(proposal_id).or_default().push(id);
        self.open_rounds.insert(proposal_id, id);
        tracing::info!(round_id = %id, %proposal_id, %end_tick, "consensus round opened");
        self.events.emit(ProtocolEvent::RoundOpened {
            round_id: id,
            proposal_id,
            end_tick,
        });
        Ok(id)
    }

    /// Cast the caller's signed vote.
    ///
    /// The signature must be over the consensus vote message for
    /// `(round_id, caller, support)` in this engine's domain.
    pub fn cast_vote(
        &mut self,
        ctx: &CallContext,
        stakes: &StakeLedger,
        round_id: RoundId,
        support: bool,
        signature: VoteSignature,
    ) -> Result<(), ConsensusError> {
        let voter = ctx.caller;
        let round = self
            .rounds
            .get(&round_id)
            .ok_or(ConsensusError::RoundNotFound { round_id })?;
        if !stakes.is_active(&voter) {
            return Err(ConsensusError::NotInActiveSet { voter });
        }
        if round.finalized {
            return Err(ConsensusError::RoundFinalized { round_id });
        }
        if ctx.now.is_after(round.end_tick) {
            return Err(ConsensusError::VotingEnded {
                round_id,
                end_tick: round.end_tick,
                now: ctx.now,
            });
        }
        if round.has_voted(&voter) {
            return Err(ConsensusError::AlreadyVoted { round_id, voter });
        }
        let message = VoteMessage {
            domain: self.config.vote_domain(),
            id: round_id.value(),
            voter,
            support,
        };
        verify_vote(&message, &signature).map_err(ConsensusError::InvalidSignature)?;
        let (votes_for, votes_against) = if support {
            (
                round.votes_for.checked_add(1).ok_or(ConsensusError::Overflow)?,
                round.votes_against,
            )
        } else {
            (
                round.votes_for,
                round
                    .votes_against
                    .checked_add(1)
                    .ok_or(ConsensusError::Overflow)?,
            )
        };

        let round = self
            .rounds
            .get_mut(&round_id)
            .ok_or(ConsensusError::RoundNotFound { round_id })?;
        round.votes_for = votes_for;
        round.votes_against = votes_against;
        round.votes.insert(
            voter,
            VoteRecord {
                support,
                signature,
                cast_at: ctx.now,
            },
        );
        tracing::info!(%round_id, %voter, support, votes_for, votes_against, "consensus vote cast");
        self.events.emit(ProtocolEvent::VoteCast {
            subject: VoteSubject::Round(round_id),
            voter,
            support,
        });
        Ok(())
    }

    /// Close a round strictly after its window and report whether the
    /// proposal was approved.
    pub fn finalize(
        &mut self,
        ctx: &CallContext,
        stakes: &StakeLedger,
        round_id: RoundId,
    ) -> Result<bool, ConsensusError> {
        let round = self
            .rounds
            .get_mut(&round_id)
            .ok_or(ConsensusError::RoundNotFound { round_id })?;
        if round.finalized {
            return Err(ConsensusError::AlreadyFinalized { round_id });
        }
        if !ctx.now.is_after(round.end_tick) {
            return Err(ConsensusError::VotingActive {
                round_id,
                end_tick: round.end_tick,
                now: ctx.now,
            });
        }
        let active_set_size = stakes.active_set_size();
        let approved = consensus_outcome(round.votes_for, round.votes_against, active_set_size);
        round.finalized = true;
        round.approved = Some(approved);
        let (proposal_id, votes_for, votes_against) =
            (round.proposal_id, round.votes_for, round.votes_against);
        self.open_rounds.remove(&proposal_id);
        tracing::info!(
            %round_id,
            %proposal_id,
            approved,
            votes_for,
            votes_against,
            active_set_size,
            "consensus round finalized"
        );
        self.events.emit(ProtocolEvent::RoundFinalized {
            round_id,
            proposal_id,
            approved,
            votes_for,
            votes_against,
        });
        Ok(approved)
    }

    // ── Administration ─────────────────────────────────────────────────

    /// Grant `role` to `account`. Admin only.
    pub fn grant_role(
        &mut self,
        ctx: &CallContext,
        role: Role,
        account: Address,
    ) -> Result<(), ConsensusError> {
        if self.access.grant(&ctx.caller, role, account)? {
            self.events.emit(ProtocolEvent::RoleGranted { role, account });
        }
        Ok(())
    }

    /// Revoke `role` from `account`. Admin only.
    pub fn revoke_role(
        &mut self,
        ctx: &CallContext,
        role: Role,
        account: Address,
    ) -> Result<(), ConsensusError> {
        if self.access.revoke(&ctx.caller, role, &account)? {
            self.events.emit(ProtocolEvent::RoleRevoked { role, account });
        }
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// One round.
    pub fn round(&self, round_id: RoundId) -> Option<&ConsensusRound> {
        self.rounds.get(&round_id)
    }

    /// Every round ever opened for `proposal_id`, oldest first.
    pub fn rounds_for(&self, proposal_id: ProposalId) -> &[RoundId] {
        self.by_proposal
            .get(&proposal_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The unfinalized round for `proposal_id`, if any.
    pub fn open_round_for(&self, proposal_id: ProposalId) -> Option<RoundId> {
        self.open_rounds.get(&proposal_id).copied()
    }

    /// The vote `voter` cast on `round_id`, if any.
    pub fn vote_of(&self, round_id: RoundId, voter: &Address) -> Option<&VoteRecord> {
        self.rounds.get(&round_id)?.votes.get(voter)
    }

    /// The message a voter must sign for `round_id`.
    pub fn vote_message(&self, round_id: RoundId, voter: Address, support: bool) -> VoteMessage {
        VoteMessage {
            domain: self.config.vote_domain(),
            id: round_id.value(),
            voter,
            support,
        }
    }

    /// Deployment vote domain.
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Role membership.
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Events emitted since the last drain.
    pub fn events_mut(&mut self) -> &mut EventBuffer {
        &mut self.events
    }
}
