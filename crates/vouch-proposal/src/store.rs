//! # Proposal Store
//!
//! Proposal records plus two ordered indexes (state → ids, proposer → ids)
//! kept in step with every transition.

use std::collections::{BTreeMap, BTreeSet};

use vouch_core::{
    AccessControl, Address, CallContext, ContentHash, EventBuffer, ProposalId, ProtocolEvent,
    Role, Tick,
};
use vouch_staking::StakeLedger;
use vouch_token::ValidityOracle;

use crate::config::ProposalConfig;
use crate::error::ProposalError;
use crate::proposal::{Proposal, ProposalState};

/// Proposal records and their lifecycle.
#[derive(Debug, Clone)]
pub struct ProposalStore {
    config: ProposalConfig,
    access: AccessControl,
    next_id: ProposalId,
    proposals: BTreeMap<ProposalId, Proposal>,
    by_state: BTreeMap<ProposalState, BTreeSet<ProposalId>>,
    by_proposer: BTreeMap<Address, BTreeSet<ProposalId>>,
    events: EventBuffer,
}

impl ProposalStore {
    /// Create an empty store administered by `admin`.
    pub fn new(admin: Address, config: ProposalConfig) -> Self {
        Self {
            config,
            access: AccessControl::new(admin),
            next_id: ProposalId::FIRST,
            proposals: BTreeMap::new(),
            by_state: BTreeMap::new(),
            by_proposer: BTreeMap::new(),
            events: EventBuffer::new(),
        }
    }

    /// Submit a proposal. Any caller may submit.
    ///
    /// When an oracle is supplied its verdict is stored as the validation
    /// flag; an oracle failure is logged and leaves the flag unset.
    pub fn submit<O: ValidityOracle + ?Sized>(
        &mut self,
        ctx: &CallContext,
        content_hash: ContentHash,
        metadata: Vec<u8>,
        oracle: Option<&O>,
    ) -> Result<ProposalId, ProposalError> {
        if content_hash.is_zero() {
            return Err(ProposalError::InvalidContentHash);
        }
        if metadata.is_empty() {
            return Err(ProposalError::EmptyMetadata);
        }
        let id = self.next_id;
        let next_id = id.checked_next().ok_or(ProposalError::Overflow)?;

        let proposal = Proposal {
            id,
            proposer: ctx.caller,
            content_hash,
            metadata,
            state: ProposalState::Proposed,
            created_at: ctx.now,
            challenge_window_end: None,
            challenger: None,
            approvals: 0,
            approved_by: BTreeSet::new(),
            oracle_validated: false,
            transition_log: Vec::new(),
        };
        self.next_id = next_id;
        self.proposals.insert(id, proposal);
        self.by_state
            .entry(ProposalState::Proposed)
            .or_default()
            .insert(id);
        self.by_proposer.entry(ctx.caller).or_default().insert(id);
        tracing::info!(proposal_id = %id, proposer = %ctx.caller, content_hash = %content_hash, "proposal submitted");
        self.events.emit(ProtocolEvent::ProposalCreated {
            proposal_id: id,
            proposer: ctx.caller,
            content_hash,
        });

        if let Some(oracle) = oracle {
            self.apply_oracle(id, oracle);
        }
        Ok(id)
    }

    /// Move a Proposed proposal to OptimisticApproved and open its
    /// challenge window. Operator only. Returns the window end.
    pub fn approve_optimistically(
        &mut self,
        ctx: &CallContext,
        id: ProposalId,
    ) -> Result<Tick, ProposalError> {
        self.access.require(Role::Operator, &ctx.caller)?;
        let window_end = ctx
            .now
            .checked_add(self.config.challenge_window)
            .ok_or(ProposalError::Overflow)?;
        let proposal = self.get(id)?;
        if proposal.state != ProposalState::Proposed {
            return Err(ProposalError::InvalidStateTransition {
                id,
                from: proposal.state,
                to: ProposalState::OptimisticApproved,
            });
        }
        self.transition(id, ProposalState::OptimisticApproved, ctx, "")?;
        self.get_mut(id)?.challenge_window_end = Some(window_end);
        self.events.emit(ProtocolEvent::ProposalApproved {
            proposal_id: id,
            challenge_window_end: window_end,
        });
        Ok(window_end)
    }

    /// Contest an optimistically approved proposal within its window.
    ///
    /// The caller must be in the active set. A challenge exactly at the
    /// window end is accepted.
    pub fn challenge(
        &mut self,
        ctx: &CallContext,
        stakes: &StakeLedger,
        id: ProposalId,
    ) -> Result<(), ProposalError> {
        if !stakes.is_active(&ctx.caller) {
            return Err(ProposalError::NotActiveParticipant { caller: ctx.caller });
        }
        self.ensure_challengeable(id, ctx.now)?;
        self.transition(id, ProposalState::Challenged, ctx, "")?;
        self.get_mut(id)?.challenger = Some(ctx.caller);
        self.events.emit(ProtocolEvent::ProposalChallenged {
            proposal_id: id,
            challenger: ctx.caller,
        });
        Ok(())
    }

    /// Finalize an unchallenged proposal strictly after its window.
    pub fn finalize(&mut self, ctx: &CallContext, id: ProposalId) -> Result<(), ProposalError> {
        let proposal = self.get(id)?;
        if proposal.state != ProposalState::OptimisticApproved {
            return Err(ProposalError::InvalidStateTransition {
                id,
                from: proposal.state,
                to: ProposalState::Finalized,
            });
        }
        let window_end = proposal.challenge_window_end.unwrap_or(proposal.created_at);
        if !ctx.now.is_after(window_end) {
            return Err(ProposalError::ChallengeWindowActive {
                id,
                window_end,
                now: ctx.now,
            });
        }
        self.transition(id, ProposalState::Finalized, ctx, "")?;
        self.events
            .emit(ProtocolEvent::ProposalFinalized { proposal_id: id });
        Ok(())
    }

    /// Reject a non-terminal proposal. Operator only.
    pub fn reject(
        &mut self,
        ctx: &CallContext,
        id: ProposalId,
        reason: &str,
    ) -> Result<(), ProposalError> {
        self.access.require(Role::Operator, &ctx.caller)?;
        self.transition(id, ProposalState::Rejected, ctx, reason)?;
        self.events.emit(ProtocolEvent::ProposalRejected {
            proposal_id: id,
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// Count one active validator's approval. Does not change state.
    ///
    /// Returns the new approval count.
    pub fn record_approval(
        &mut self,
        ctx: &CallContext,
        stakes: &StakeLedger,
        id: ProposalId,
    ) -> Result<u64, ProposalError> {
        if !stakes.is_active(&ctx.caller) {
            return Err(ProposalError::NotActiveParticipant { caller: ctx.caller });
        }
        let proposal = self.get(id)?;
        if !proposal.state.accepts_approvals() {
            return Err(ProposalError::InvalidStateTransition {
                id,
                from: proposal.state,
                to: proposal.state,
            });
        }
        if proposal.approved_by.contains(&ctx.caller) {
            return Err(ProposalError::AlreadyApproved {
                id,
                participant: ctx.caller,
            });
        }
        let approvals = proposal
            .approvals
            .checked_add(1)
            .ok_or(ProposalError::Overflow)?;
        let proposal = self.get_mut(id)?;
        proposal.approved_by.insert(ctx.caller);
        proposal.approvals = approvals;
        tracing::info!(proposal_id = %id, participant = %ctx.caller, approvals, "approval recorded");
        self.events.emit(ProtocolEvent::ApprovalRecorded {
            proposal_id: id,
            participant: ctx.caller,
            approvals,
        });
        Ok(approvals)
    }

    /// Ask the oracle again. Returns the stored flag afterwards; an oracle
    /// failure keeps the previous value.
    pub fn revalidate<O: ValidityOracle + ?Sized>(
        &mut self,
        id: ProposalId,
        oracle: &O,
    ) -> Result<bool, ProposalError> {
        self.get(id)?;
        self.apply_oracle(id, oracle);
        Ok(self.get(id)?.oracle_validated)
    }

    // ── Administration ─────────────────────────────────────────────────

    /// Change the challenge window for future approvals. Admin only.
    pub fn set_challenge_window(&mut self, ctx: &CallContext, ticks: u64) -> Result<(), ProposalError> {
        self.access.require_admin(&ctx.caller)?;
        self.config.challenge_window = ticks;
        tracing::info!(ticks, "challenge window updated");
        Ok(())
    }

    /// Grant `role` to `account`. Admin only.
    pub fn grant_role(
        &mut self,
        ctx: &CallContext,
        role: Role,
        account: Address,
    ) -> Result<(), ProposalError> {
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
    ) -> Result<(), ProposalError> {
        if self.access.revoke(&ctx.caller, role, &account)? {
            self.events.emit(ProtocolEvent::RoleRevoked { role, account });
        }
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// One proposal.
    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    /// Like [`proposal`](Self::proposal), failing with `NotFound`.
    pub fn get(&self, id: ProposalId) -> Result<&Proposal, ProposalError> {
        self.proposals.get(&id).ok_or(ProposalError::NotFound { id })
    }

    /// Whether a challenge (or dispute) against `id` would be accepted at
    /// `now`.
    pub fn is_challengeable(&self, id: ProposalId, now: Tick) -> bool {
        self.proposals
            .get(&id)
            .is_some_and(|p| p.is_challengeable_at(now))
    }

    /// The challenge-window check shared with the dispute game.
    pub fn ensure_challengeable(&self, id: ProposalId, now: Tick) -> Result<&Proposal, ProposalError> {
        let proposal = self.get(id)?;
        if proposal.state != ProposalState::OptimisticApproved {
            return Err(ProposalError::NotChallengeable {
                id,
                state: proposal.state,
            });
        }
        let window_end = proposal.challenge_window_end.unwrap_or(proposal.created_at);
        if now.is_after(window_end) {
            return Err(ProposalError::ChallengeWindowExpired {
                id,
                window_end,
                now,
            });
        }
        Ok(proposal)
    }

    /// Ids currently in `state`, ascending.
    pub fn proposals_in_state(&self, state: ProposalState) -> impl Iterator<Item = ProposalId> + '_ {
        self.by_state.get(&state).into_iter().flatten().copied()
    }

    /// Ids submitted by `proposer`, ascending.
    pub fn proposals_by(&self, proposer: &Address) -> impl Iterator<Item = ProposalId> + '_ {
        self.by_proposer.get(proposer).into_iter().flatten().copied()
    }

    /// Number of proposals ever submitted.
    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    /// Whether no proposal was ever submitted.
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Current configuration.
    pub fn config(&self) -> &ProposalConfig {
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

    // ── Internals ──────────────────────────────────────────────────────

    fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, ProposalError> {
        self.proposals
            .get_mut(&id)
            .ok_or(ProposalError::NotFound { id })
    }

    fn transition(
        &mut self,
        id: ProposalId,
        to: ProposalState,
        ctx: &CallContext,
        reason: &str,
    ) -> Result<(), ProposalError> {
        let from = self.get_mut(id)?.transition(to, ctx.now, ctx.caller, reason)?;
        if let Some(ids) = self.by_state.get_mut(&from) {
            ids.remove(&id);
        }
        self.by_state.entry(to).or_default().insert(id);
        tracing::info!(proposal_id = %id, %from, %to, actor = %ctx.caller, "proposal transition");
        Ok(())
    }

    fn apply_oracle<O: ValidityOracle + ?Sized>(&mut self, id: ProposalId, oracle: &O) {
        let Some(proposal) = self.proposals.get_mut(&id) else {
            return;
        };
        match oracle.check(&proposal.content_hash) {
            Ok(valid) => {
                proposal.oracle_validated = valid;
                tracing::debug!(proposal_id = %id, valid, "oracle checked");
                self.events.emit(ProtocolEvent::OracleChecked {
                    proposal_id: id,
                    valid,
                });
            }
            Err(e) => {
                tracing::warn!(proposal_id = %id, error = %e, "validity oracle unavailable");
            }
        }
    }
}
