//! # Protocol Instance
//!
//! [`Protocol`] owns one of each component, the token ledger, an optional
//! validity oracle, and the tick clock. Every mutating operation:
//!
//! 1. enters the shared [`ReentrancyGuard`] (a nested entry fails),
//! 2. builds a [`CallContext`] from the caller and the current tick,
//! 3. runs the component operation,
//! 4. on success appends the components' buffered events to the protocol
//!    event log, on failure discards whatever they buffered.

use vouch_consensus::ConsensusEngine;
use vouch_core::{
    Address, Amount, CallContext, ContentHash, DisputeId, ProposalId, ProtocolEvent,
    ReentrancyGuard, Role, RoundId, Tick,
};
use vouch_crypto::{VoteMessage, VoteSignature};
use vouch_dispute::{DisputeGame, Settlement};
use vouch_proposal::ProposalStore;
use vouch_staking::StakeLedger;
use vouch_token::{MockOracle, TokenLedger, ValidityOracle};

use crate::config::ProtocolConfig;
use crate::error::ProtocolError;

/// A complete protocol deployment over token ledger `T` and oracle `O`.
#[derive(Debug)]
pub struct Protocol<T, O = MockOracle> {
    config: ProtocolConfig,
    token: T,
    oracle: Option<O>,
    now: Tick,
    guard: ReentrancyGuard,
    stakes: StakeLedger,
    proposals: ProposalStore,
    consensus: ConsensusEngine,
    disputes: DisputeGame,
    events: Vec<ProtocolEvent>,
}

impl<T: TokenLedger, O: ValidityOracle> Protocol<T, O> {
    /// Deploy every component from `config`.
    ///
    /// The dispute game is granted [`Role::Slasher`] on the stake ledger.
    /// The clock starts at tick zero.
    pub fn new(config: ProtocolConfig, token: T, oracle: Option<O>) -> Result<Self, ProtocolError> {
        config.validate()?;
        let admin = CallContext::new(config.admin, Tick::ZERO);
        let mut stakes = StakeLedger::new(
            config.staking_address,
            config.admin,
            config.treasury,
            config.staking.clone(),
        )?;
        stakes.grant_role(&admin, Role::Slasher, config.dispute_address)?;
        let proposals = ProposalStore::new(config.admin, config.proposal.clone());
        let consensus = ConsensusEngine::new(config.admin, config.consensus());
        let disputes = DisputeGame::new(
            config.dispute_address,
            config.admin,
            config.chain_id,
            config.dispute.clone(),
        )?;
        let mut protocol = Self {
            config,
            token,
            oracle,
            now: Tick::ZERO,
            guard: ReentrancyGuard::new(),
            stakes,
            proposals,
            consensus,
            disputes,
            events: Vec::new(),
        };
        protocol.collect_events();
        tracing::info!(
            chain_id = protocol.config.chain_id,
            staking = %protocol.config.staking_address,
            consensus = %protocol.config.consensus_address,
            dispute = %protocol.config.dispute_address,
            oracle = protocol.oracle.is_some(),
            "protocol deployed"
        );
        Ok(protocol)
    }

    // ── Clock ──────────────────────────────────────────────────────────

    /// The current tick.
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Move the clock to `tick`. Never backwards.
    pub fn advance_to(&mut self, tick: Tick) -> Result<(), ProtocolError> {
        let _scope = self.guard.enter("advance_to")?;
        if tick < self.now {
            return Err(ProtocolError::ClockRegression {
                now: self.now,
                requested: tick,
            });
        }
        tracing::debug!(from = %self.now, to = %tick, "clock advanced");
        self.now = tick;
        Ok(())
    }

    /// Move the clock forward by `ticks`.
    pub fn advance_by(&mut self, ticks: u64) -> Result<Tick, ProtocolError> {
        let target = self.now.checked_add(ticks).ok_or(ProtocolError::Overflow)?;
        self.advance_to(target)?;
        Ok(target)
    }

    // ── Stake Ledger ───────────────────────────────────────────────────

    /// Register `caller` with an initial stake.
    pub fn register(&mut self, caller: Address, amount: Amount) -> Result<(), ProtocolError> {
        self.execute("register", caller, |p, ctx| {
            p.stakes.register(ctx, &mut p.token, amount)
        })
    }

    /// Add to `caller`'s stake.
    pub fn increase_stake(&mut self, caller: Address, amount: Amount) -> Result<(), ProtocolError> {
        self.execute("increase_stake", caller, |p, ctx| {
            p.stakes.increase_stake(ctx, &mut p.token, amount)
        })
    }

    /// Register or top up, whichever applies.
    pub fn deposit(&mut self, caller: Address, amount: Amount) -> Result<(), ProtocolError> {
        self.execute("deposit", caller, |p, ctx| {
            p.stakes.deposit(ctx, &mut p.token, amount)
        })
    }

    /// Start unbonding `amount`. Returns the tick it becomes claimable.
    pub fn request_withdrawal(&mut self, caller: Address, amount: Amount) -> Result<Tick, ProtocolError> {
        self.execute("request_withdrawal", caller, |p, ctx| {
            p.stakes.request_withdrawal(ctx, amount)
        })
    }

    /// Pay out `caller`'s matured withdrawal.
    pub fn complete_withdrawal(&mut self, caller: Address) -> Result<Amount, ProtocolError> {
        self.execute("complete_withdrawal", caller, |p, ctx| {
            p.stakes.complete_withdrawal(ctx, &mut p.token)
        })
    }

    /// Slash `participant` directly. Requires the slasher role.
    pub fn slash(
        &mut self,
        caller: Address,
        participant: Address,
        amount: Amount,
        reason: &str,
    ) -> Result<Amount, ProtocolError> {
        self.execute("slash", caller, |p, ctx| {
            p.stakes.slash(ctx, &mut p.token, &participant, amount, reason)
        })
    }

    /// Change the minimum stake. Admin only.
    pub fn set_min_stake(&mut self, caller: Address, min_stake: Amount) -> Result<(), ProtocolError> {
        self.execute("set_min_stake", caller, |p, ctx| {
            p.stakes.set_min_stake(ctx, min_stake)
        })
    }

    /// Change the active-set limit. Admin only.
    pub fn set_max_active_validators(&mut self, caller: Address, limit: usize) -> Result<(), ProtocolError> {
        self.execute("set_max_active_validators", caller, |p, ctx| {
            p.stakes.set_max_active_validators(ctx, limit)
        })
    }

    /// Change the bonding period. Admin only.
    pub fn set_bonding_period(&mut self, caller: Address, ticks: u64) -> Result<(), ProtocolError> {
        self.execute("set_bonding_period", caller, |p, ctx| {
            p.stakes.set_bonding_period(ctx, ticks)
        })
    }

    // ── Proposal Store ─────────────────────────────────────────────────

    /// Submit a proposal, consulting the oracle if one is configured.
    pub fn submit_proposal(
        &mut self,
        caller: Address,
        content_hash: ContentHash,
        metadata: Vec<u8>,
    ) -> Result<ProposalId, ProtocolError> {
        self.execute("submit_proposal", caller, |p, ctx| {
            p.proposals
                .submit(ctx, content_hash, metadata, p.oracle.as_ref())
        })
    }

    /// Optimistically approve a proposal. Operator only.
    pub fn approve_optimistically(&mut self, caller: Address, id: ProposalId) -> Result<Tick, ProtocolError> {
        self.execute("approve_optimistically", caller, |p, ctx| {
            p.proposals.approve_optimistically(ctx, id)
        })
    }

    /// Challenge a proposal within its window.
    pub fn challenge(&mut self, caller: Address, id: ProposalId) -> Result<(), ProtocolError> {
        self.execute("challenge", caller, |p, ctx| {
            p.proposals.challenge(ctx, &p.stakes, id)
        })
    }

    /// Finalize an unchallenged proposal after its window.
    pub fn finalize_proposal(&mut self, caller: Address, id: ProposalId) -> Result<(), ProtocolError> {
        self.execute("finalize_proposal", caller, |p, ctx| {
            p.proposals.finalize(ctx, id)
        })
    }

    /// Reject a proposal. Operator only.
    pub fn reject_proposal(
        &mut self,
        caller: Address,
        id: ProposalId,
        reason: &str,
    ) -> Result<(), ProtocolError> {
        self.execute("reject_proposal", caller, |p, ctx| {
            p.proposals.reject(ctx, id, reason)
        })
    }

    /// Record `caller`'s approval of a proposal.
    pub fn record_approval(&mut self, caller: Address, id: ProposalId) -> Result<u64, ProtocolError> {
        self.execute("record_approval", caller, |p, ctx| {
            p.proposals.record_approval(ctx, &p.stakes, id)
        })
    }

    /// Ask the oracle again about a proposal's content.
    pub fn revalidate(&mut self, caller: Address, id: ProposalId) -> Result<bool, ProtocolError> {
        self.execute("revalidate", caller, |p, _ctx| -> Result<bool, ProtocolError> {
            let oracle = p.oracle.as_ref().ok_or(ProtocolError::OracleNotConfigured)?;
            p.proposals.revalidate(id, oracle).map_err(ProtocolError::from)
        })
    }

    /// Change the challenge window for future approvals. Admin only.
    pub fn set_challenge_window(&mut self, caller: Address, ticks: u64) -> Result<(), ProtocolError> {
        self.execute("set_challenge_window", caller, |p, ctx| {
            p.proposals.set_challenge_window(ctx, ticks)
        })
    }

    // ── Consensus Engine ───────────────────────────────────────────────

    /// Open a consensus round for a challenged proposal. Operator only.
    pub fn open_round(&mut self, caller: Address, proposal_id: ProposalId) -> Result<RoundId, ProtocolError> {
        self.execute("open_round", caller, |p, ctx| {
            p.consensus.open_round(ctx, &p.proposals, proposal_id)
        })
    }

    /// Cast a signed consensus vote.
    pub fn cast_vote(
        &mut self,
        caller: Address,
        round_id: RoundId,
        support: bool,
        signature: VoteSignature,
    ) -> Result<(), ProtocolError> {
        self.execute("cast_vote", caller, |p, ctx| {
            p.consensus
                .cast_vote(ctx, &p.stakes, round_id, support, signature)
        })
    }

    /// Finalize a round after its window.
    pub fn finalize_round(&mut self, caller: Address, round_id: RoundId) -> Result<bool, ProtocolError> {
        self.execute("finalize_round", caller, |p, ctx| {
            p.consensus.finalize(ctx, &p.stakes, round_id)
        })
    }

    // ── Dispute Game ───────────────────────────────────────────────────

    /// Open a dispute, escrowing `bond` from `caller`.
    pub fn open_dispute(
        &mut self,
        caller: Address,
        proposal_id: ProposalId,
        bond: Amount,
    ) -> Result<DisputeId, ProtocolError> {
        self.execute("open_dispute", caller, |p, ctx| {
            p.disputes
                .open(ctx, &mut p.token, &p.stakes, &p.proposals, proposal_id, bond)
        })
    }

    /// Cast a signed dispute vote.
    pub fn vote_dispute(
        &mut self,
        caller: Address,
        dispute_id: DisputeId,
        support: bool,
        signature: VoteSignature,
    ) -> Result<(), ProtocolError> {
        self.execute("vote_dispute", caller, |p, ctx| {
            p.disputes
                .vote(ctx, &p.stakes, dispute_id, support, signature)
        })
    }

    /// Resolve a dispute after its window and settle the bond.
    pub fn resolve_dispute(&mut self, caller: Address, dispute_id: DisputeId) -> Result<Settlement, ProtocolError> {
        self.execute("resolve_dispute", caller, |p, ctx| {
            p.disputes
                .resolve(ctx, &mut p.token, &mut p.stakes, dispute_id)
        })
    }

    /// Cancel an active dispute. Operator only.
    pub fn cancel_dispute(
        &mut self,
        caller: Address,
        dispute_id: DisputeId,
        reason: &str,
    ) -> Result<(), ProtocolError> {
        self.execute("cancel_dispute", caller, |p, ctx| {
            p.disputes.cancel(ctx, &mut p.token, dispute_id, reason)
        })
    }

    /// Change the minimum dispute bond. Admin only.
    pub fn set_min_bond(&mut self, caller: Address, min_bond: Amount) -> Result<(), ProtocolError> {
        self.execute("set_min_bond", caller, |p, ctx| {
            p.disputes.set_min_bond(ctx, min_bond)
        })
    }

    // ── Roles ──────────────────────────────────────────────────────────

    /// Grant the operator role on the proposal store, consensus engine, and
    /// dispute game. Admin only.
    pub fn grant_operator(&mut self, caller: Address, account: Address) -> Result<(), ProtocolError> {
        self.execute("grant_operator", caller, |p, ctx| {
            p.proposals.grant_role(ctx, Role::Operator, account)?;
            p.consensus.grant_role(ctx, Role::Operator, account)?;
            p.disputes.grant_role(ctx, Role::Operator, account)?;
            Ok::<_, ProtocolError>(())
        })
    }

    /// Revoke the operator role everywhere. Admin only.
    pub fn revoke_operator(&mut self, caller: Address, account: Address) -> Result<(), ProtocolError> {
        self.execute("revoke_operator", caller, |p, ctx| {
            p.proposals.revoke_role(ctx, Role::Operator, account)?;
            p.consensus.revoke_role(ctx, Role::Operator, account)?;
            p.disputes.revoke_role(ctx, Role::Operator, account)?;
            Ok::<_, ProtocolError>(())
        })
    }

    // ── Signing helpers ────────────────────────────────────────────────

    /// The message `voter` signs for a consensus vote.
    pub fn round_vote_message(&self, round_id: RoundId, voter: Address, support: bool) -> VoteMessage {
        self.consensus.vote_message(round_id, voter, support)
    }

    /// The message `voter` signs for a dispute vote.
    pub fn dispute_vote_message(&self, dispute_id: DisputeId, voter: Address, support: bool) -> VoteMessage {
        self.disputes.vote_message(dispute_id, voter, support)
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Deployment configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// The token ledger.
    pub fn token(&self) -> &T {
        &self.token
    }

    /// The token ledger, for operations outside the protocol (minting,
    /// approvals).
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    /// The validity oracle, if configured.
    pub fn oracle(&self) -> Option<&O> {
        self.oracle.as_ref()
    }

    /// The validity oracle, if configured.
    pub fn oracle_mut(&mut self) -> Option<&mut O> {
        self.oracle.as_mut()
    }

    /// The stake ledger.
    pub fn stakes(&self) -> &StakeLedger {
        &self.stakes
    }

    /// The proposal store.
    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    /// The consensus engine.
    pub fn consensus(&self) -> &ConsensusEngine {
        &self.consensus
    }

    /// The dispute game.
    pub fn disputes(&self) -> &DisputeGame {
        &self.disputes
    }

    /// A handle on the re-entrancy guard, for collaborators that call back
    /// into the protocol.
    pub fn guard(&self) -> ReentrancyGuard {
        self.guard.clone()
    }

    /// Every event since deployment or the last drain, in order.
    pub fn events(&self) -> &[ProtocolEvent] {
        &self.events
    }

    /// Take the event log.
    pub fn drain_events(&mut self) -> Vec<ProtocolEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn execute<R, E>(
        &mut self,
        operation: &'static str,
        caller: Address,
        op: impl FnOnce(&mut Self, &CallContext) -> Result<R, E>,
    ) -> Result<R, ProtocolError>
    where
        ProtocolError: From<E>,
    {
        let _scope = self.guard.enter(operation)?;
        let ctx = CallContext::new(caller, self.now);
        let marks = self.event_marks();
        match op(self, &ctx) {
            Ok(value) => {
                self.collect_events();
                Ok(value)
            }
            Err(err) => {
                self.discard_events(marks);
                let err = ProtocolError::from(err);
                tracing::debug!(
                    operation,
                    %caller,
                    now = %ctx.now,
                    category = %err.category(),
                    error = %err,
                    "operation failed"
                );
                Err(err)
            }
        }
    }

    fn event_marks(&mut self) -> [usize; 4] {
        [
            self.stakes.events_mut().len(),
            self.proposals.events_mut().len(),
            self.consensus.events_mut().len(),
            self.disputes.events_mut().len(),
        ]
    }

    fn discard_events(&mut self, marks: [usize; 4]) {
        self.stakes.events_mut().truncate(marks[0]);
        self.proposals.events_mut().truncate(marks[1]);
        self.consensus.events_mut().truncate(marks[2]);
        self.disputes.events_mut().truncate(marks[3]);
    }

    fn collect_events(&mut self) {
        self.events.extend(self.stakes.events_mut().drain());
        self.events.extend(self.proposals.events_mut().drain());
        self.events.extend(self.consensus.events_mut().drain());
        self.events.extend(self.disputes.events_mut().drain());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_core::ErrorCategory;
    use vouch_token::InMemoryToken;

    const ADMIN: Address = Address::from_bytes([0xad; 20]);
    const TREASURY: Address = Address::from_bytes([0x7e; 20]);

    fn protocol() -> Protocol<InMemoryToken> {
        let token = InMemoryToken::new(ADMIN, 1_000_000);
        Protocol::new(ProtocolConfig::new(ADMIN, TREASURY), token, None).unwrap()
    }

    #[test]
    fn deployment_grants_slasher_to_dispute_game() {
        let p = protocol();
        let game = p.config().dispute_address;
        assert!(p.stakes().access().has_role(Role::Slasher, &game));
        assert_eq!(
            p.events(),
            &[ProtocolEvent::RoleGranted {
                role: Role::Slasher,
                account: game
            }]
        );
    }

    #[test]
    fn invalid_config_fails_deployment() {
        let token = InMemoryToken::new(ADMIN, 1_000_000);
        let result = Protocol::<_, MockOracle>::new(ProtocolConfig::default(), token, None);
        assert!(matches!(result, Err(ProtocolError::Config(_))));
    }

    #[test]
    fn clock_only_moves_forward() {
        let mut p = protocol();
        p.advance_to(Tick::new(10)).unwrap();
        assert_eq!(p.advance_by(5).unwrap(), Tick::new(15));
        assert_eq!(
            p.advance_to(Tick::new(14)),
            Err(ProtocolError::ClockRegression {
                now: Tick::new(15),
                requested: Tick::new(14)
            })
        );
        p.advance_to(Tick::new(15)).unwrap();
    }

    #[test]
    fn failed_operation_leaves_no_events() {
        let mut p = protocol();
        p.drain_events();
        let err = p.register(Address::from_bytes([1; 20]), 0).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Integrity);
        assert!(p.events().is_empty());
        assert!(!p.guard().is_locked());
    }

    #[test]
    fn revalidate_without_oracle() {
        let mut p = protocol();
        assert_eq!(
            p.revalidate(ADMIN, ProposalId::FIRST),
            Err(ProtocolError::OracleNotConfigured)
        );
    }

    #[test]
    fn operations_use_the_protocol_clock() {
        let mut p = protocol();
        let who = Address::from_bytes([1; 20]);
        let staking = p.config().staking_address;
        p.token_mut().mint(&ADMIN, &who, 1_000).unwrap();
        p.token_mut().approve(&who, &staking, 1_000);
        p.advance_to(Tick::new(42)).unwrap();
        p.register(who, 1_000).unwrap();
        assert_eq!(
            p.stakes().participant(&who).unwrap().registered_at,
            Tick::new(42)
        );
        assert_eq!(p.request_withdrawal(who, 1_000).unwrap(), Tick::new(142));
    }

    #[test]
    fn operator_grant_spans_components() {
        let mut p = protocol();
        let operator = Address::from_bytes([0x0b; 20]);
        p.grant_operator(ADMIN, operator).unwrap();
        assert!(p.proposals().access().has_role(Role::Operator, &operator));
        assert!(p.consensus().access().has_role(Role::Operator, &operator));
        assert!(p.disputes().access().has_role(Role::Operator, &operator));
        assert!(p.grant_operator(operator, operator).is_err());
        p.revoke_operator(ADMIN, operator).unwrap();
        assert!(!p.disputes().access().has_role(Role::Operator, &operator));
    }
}
