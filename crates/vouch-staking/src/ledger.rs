//! # Stake Ledger
//!
//! All mutating operations take a [`CallContext`] (caller and current tick)
//! and, when funds move, the [`TokenLedger`]. Every check runs before the
//! first token transfer, and ledger state is only written after the transfer
//! succeeds, so a failed operation leaves nothing behind.
//!
//! ## Custody
//!
//! Each participant's stake sits at its own stake account,
//! `keccak256(STAKE_ACCOUNT_DOMAIN || ledger || participant)[12..]`.
//! Deposits are pulled into it with `transfer_from` (the participant approves
//! the ledger's address), withdrawals and slashes are paid out of it.

use std::collections::BTreeMap;

use vouch_core::{
    AccessControl, Address, Amount, CallContext, EventBuffer, ProtocolEvent, Role, Tick,
};
use vouch_crypto::derive_address;
use vouch_token::TokenLedger;

use crate::active_set::select_active_set;
use crate::config::StakingConfig;
use crate::error::StakingError;
use crate::participant::{Participant, ParticipantStatus, PendingWithdrawal};

/// Domain tag for stake account derivation.
pub const STAKE_ACCOUNT_DOMAIN: &[u8] = b"vouch.stake-vault";

/// Participant stakes, withdrawals, slashing, and the cached active set.
#[derive(Debug, Clone)]
pub struct StakeLedger {
    address: Address,
    treasury: Address,
    config: StakingConfig,
    access: AccessControl,
    participants: BTreeMap<Address, Participant>,
    registration_order: Vec<Address>,
    active_set: Vec<Address>,
    total_staked: Amount,
    events: EventBuffer,
}

impl StakeLedger {
    /// Create an empty ledger.
    ///
    /// `address` is the ledger's own identity on the token ledger (the
    /// spender participants approve). Slashed stake goes to `treasury`.
    pub fn new(
        address: Address,
        admin: Address,
        treasury: Address,
        config: StakingConfig,
    ) -> Result<Self, StakingError> {
        config.validate().map_err(StakingError::InvalidConfig)?;
        Ok(Self {
            address,
            treasury,
            config,
            access: AccessControl::new(admin),
            participants: BTreeMap::new(),
            registration_order: Vec::new(),
            active_set: Vec::new(),
            total_staked: 0,
            events: EventBuffer::new(),
        })
    }

    // ── Deposits ───────────────────────────────────────────────────────

    /// Register the caller with an initial stake of `amount`.
    ///
    /// # Errors
    ///
    /// [`StakingError::ZeroAmount`], [`StakingError::AlreadyRegistered`],
    /// [`StakingError::InsufficientStake`] below the minimum, or a token
    /// failure pulling the deposit.
    pub fn register<T: TokenLedger + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        amount: Amount,
    ) -> Result<(), StakingError> {
        let participant = ctx.caller;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        if self.participants.contains_key(&participant) {
            return Err(StakingError::AlreadyRegistered { participant });
        }
        if amount < self.config.min_stake {
            return Err(StakingError::InsufficientStake {
                required: self.config.min_stake,
                actual: amount,
            });
        }
        let total = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let stake_account = self.stake_account_of(&participant);

        token.transfer_from(&self.address, &participant, &stake_account, amount)?;

        self.participants.insert(
            participant,
            Participant {
                address: participant,
                stake: amount,
                status: ParticipantStatus::Active,
                pending_withdrawal: None,
                registered_at: ctx.now,
                stake_account,
            },
        );
        self.registration_order.push(participant);
        self.total_staked = total;
        tracing::info!(%participant, amount, "participant registered");
        self.events.emit(ProtocolEvent::ParticipantRegistered {
            participant,
            amount,
            stake_account,
        });
        self.refresh_active_set();
        Ok(())
    }

    /// Add `amount` to the caller's existing stake.
    ///
    /// An Inactive, Unstaking, or Slashed participant whose stake reaches the
    /// minimum becomes Active again. An Inactive or Unstaking participant
    /// whose stake would stay below the minimum is refused.
    pub fn increase_stake<T: TokenLedger + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        amount: Amount,
    ) -> Result<(), StakingError> {
        let participant = ctx.caller;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let record = self.get(&participant)?;
        let new_stake = record
            .stake
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let total = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let min = self.config.min_stake;
        let new_status = match record.status {
            _ if new_stake >= min => ParticipantStatus::Active,
            ParticipantStatus::Inactive | ParticipantStatus::Unstaking => {
                return Err(StakingError::InsufficientStake {
                    required: min,
                    actual: new_stake,
                });
            }
            other => other,
        };
        let stake_account = record.stake_account;

        token.transfer_from(&self.address, &participant, &stake_account, amount)?;

        let record = self.get_mut(&participant)?;
        record.stake = new_stake;
        record.status = new_status;
        self.total_staked = total;
        tracing::info!(%participant, amount, new_stake, status = %new_status, "stake increased");
        self.events.emit(ProtocolEvent::StakeIncreased {
            participant,
            amount,
            new_stake,
        });
        self.refresh_active_set();
        Ok(())
    }

    /// Register on first deposit, top up afterwards.
    pub fn deposit<T: TokenLedger + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        amount: Amount,
    ) -> Result<(), StakingError> {
        if self.participants.contains_key(&ctx.caller) {
            self.increase_stake(ctx, token, amount)
        } else {
            self.register(ctx, token, amount)
        }
    }

    // ── Withdrawals ────────────────────────────────────────────────────

    /// Move `amount` of the caller's stake into a pending withdrawal.
    ///
    /// The stake leaves the active balance immediately; the tokens stay in
    /// the stake account until [`complete_withdrawal`](Self::complete_withdrawal).
    /// Any remainder must be zero or at least the minimum.
    pub fn request_withdrawal(
        &mut self,
        ctx: &CallContext,
        amount: Amount,
    ) -> Result<Tick, StakingError> {
        let participant = ctx.caller;
        let record = self.get(&participant)?;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        if !record.status.can_withdraw() {
            return Err(StakingError::NotActive {
                participant,
                status: record.status,
            });
        }
        if record.pending_withdrawal.is_some() {
            return Err(StakingError::WithdrawalPending { participant });
        }
        let remaining = record
            .stake
            .checked_sub(amount)
            .ok_or(StakingError::ExceedsStake {
                requested: amount,
                staked: record.stake,
            })?;
        if remaining != 0 && remaining < self.config.min_stake {
            return Err(StakingError::InsufficientStake {
                required: self.config.min_stake,
                actual: remaining,
            });
        }
        let available_at = ctx
            .now
            .checked_add(self.config.bonding_period)
            .ok_or(StakingError::Overflow)?;

        let record = self.get_mut(&participant)?;
        record.stake = remaining;
        record.pending_withdrawal = Some(PendingWithdrawal {
            amount,
            requested_at: ctx.now,
        });
        if remaining == 0 {
            record.status = ParticipantStatus::Unstaking;
        }
        let status = record.status;
        self.total_staked = self.total_staked.saturating_sub(amount);
        tracing::info!(%participant, amount, remaining, %status, %available_at, "withdrawal requested");
        self.events.emit(ProtocolEvent::WithdrawalRequested {
            participant,
            amount,
            available_at,
        });
        self.refresh_active_set();
        Ok(available_at)
    }

    /// Pay out the caller's pending withdrawal once the bonding period has
    /// elapsed. Returns the amount paid.
    pub fn complete_withdrawal<T: TokenLedger + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
    ) -> Result<Amount, StakingError> {
        let participant = ctx.caller;
        let record = self.get(&participant)?;
        let pending = record
            .pending_withdrawal
            .ok_or(StakingError::NoPendingWithdrawal { participant })?;
        let available_at = pending
            .requested_at
            .checked_add(self.config.bonding_period)
            .ok_or(StakingError::Overflow)?;
        if ctx.now < available_at {
            return Err(StakingError::BondingPeriodNotMet {
                available_at,
                now: ctx.now,
            });
        }
        let stake_account = record.stake_account;

        token.transfer(&stake_account, &participant, pending.amount)?;

        let min = self.config.min_stake;
        let record = self.get_mut(&participant)?;
        record.pending_withdrawal = None;
        record.status = if record.stake == 0 {
            ParticipantStatus::Inactive
        } else if record.stake >= min {
            ParticipantStatus::Active
        } else {
            ParticipantStatus::Slashed
        };
        let status = record.status;
        tracing::info!(%participant, amount = pending.amount, %status, "withdrawal completed");
        self.events.emit(ProtocolEvent::WithdrawalCompleted {
            participant,
            amount: pending.amount,
        });
        self.refresh_active_set();
        Ok(pending.amount)
    }

    // ── Slashing ───────────────────────────────────────────────────────

    /// Reduce `participant`'s stake by up to `amount`, moving the slashed
    /// tokens to the treasury.
    ///
    /// Returns the amount actually applied, `min(amount, stake)`. Pending
    /// withdrawals are not touched. When nothing is applied the participant
    /// is left as is and no event is emitted. Requires [`Role::Slasher`].
    pub fn slash<T: TokenLedger + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        participant: &Address,
        amount: Amount,
        reason: &str,
    ) -> Result<Amount, StakingError> {
        let applied = self.slash_preview(ctx, participant, amount)?;
        if applied == 0 {
            tracing::debug!(%participant, requested = amount, reason, "nothing to slash");
            return Ok(0);
        }
        let stake_account = self.get(participant)?.stake_account;

        token.transfer(&stake_account, &self.treasury, applied)?;

        let min = self.config.min_stake;
        let record = self.get_mut(participant)?;
        record.stake -= applied;
        if record.stake == 0 {
            record.status = ParticipantStatus::Inactive;
        } else if record.stake < min {
            record.status = ParticipantStatus::Slashed;
        }
        let status = record.status;
        self.total_staked = self.total_staked.saturating_sub(applied);
        tracing::warn!(
            %participant,
            requested = amount,
            applied,
            %status,
            reason,
            "participant slashed"
        );
        self.events.emit(ProtocolEvent::Slashed {
            participant: *participant,
            requested: amount,
            applied,
            reason: reason.to_string(),
        });
        self.refresh_active_set();
        Ok(applied)
    }

    /// The amount [`slash`](Self::slash) would apply right now, after the
    /// same checks. Touches nothing.
    pub fn slash_preview(
        &self,
        ctx: &CallContext,
        participant: &Address,
        amount: Amount,
    ) -> Result<Amount, StakingError> {
        self.access.require(Role::Slasher, &ctx.caller)?;
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        Ok(amount.min(self.get(participant)?.stake))
    }

    // ── Administration ─────────────────────────────────────────────────

    /// Change the minimum stake. Admin only.
    pub fn set_min_stake(&mut self, ctx: &CallContext, min_stake: Amount) -> Result<(), StakingError> {
        self.access.require_admin(&ctx.caller)?;
        let config = StakingConfig {
            min_stake,
            ..self.config.clone()
        };
        config.validate().map_err(StakingError::InvalidConfig)?;
        self.config = config;
        tracing::info!(min_stake, "minimum stake updated");
        self.refresh_active_set();
        Ok(())
    }

    /// Change the active-set limit. Admin only.
    pub fn set_max_active_validators(
        &mut self,
        ctx: &CallContext,
        limit: usize,
    ) -> Result<(), StakingError> {
        self.access.require_admin(&ctx.caller)?;
        let config = StakingConfig {
            max_active_validators: limit,
            ..self.config.clone()
        };
        config.validate().map_err(StakingError::InvalidConfig)?;
        self.config = config;
        tracing::info!(limit, "active-set limit updated");
        self.refresh_active_set();
        Ok(())
    }

    /// Change the bonding period. Applies to pending withdrawals too. Admin
    /// only.
    pub fn set_bonding_period(&mut self, ctx: &CallContext, ticks: u64) -> Result<(), StakingError> {
        self.access.require_admin(&ctx.caller)?;
        self.config.bonding_period = ticks;
        tracing::info!(ticks, "bonding period updated");
        Ok(())
    }

    /// Grant `role` to `account`. Admin only.
    pub fn grant_role(
        &mut self,
        ctx: &CallContext,
        role: Role,
        account: Address,
    ) -> Result<(), StakingError> {
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
    ) -> Result<(), StakingError> {
        if self.access.revoke(&ctx.caller, role, &account)? {
            self.events.emit(ProtocolEvent::RoleRevoked { role, account });
        }
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// The ledger's own identity on the token ledger.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Where slashed stake is sent.
    pub fn treasury(&self) -> Address {
        self.treasury
    }

    /// Current configuration.
    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    /// Role membership.
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    /// One participant's record.
    pub fn participant(&self, address: &Address) -> Option<&Participant> {
        self.participants.get(address)
    }

    /// Every participant, in registration order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.registration_order
            .iter()
            .filter_map(|a| self.participants.get(a))
    }

    /// Active stake of `address`, zero if unknown.
    pub fn stake_of(&self, address: &Address) -> Amount {
        self.participants.get(address).map_or(0, |p| p.stake)
    }

    /// Sum of every participant's active stake.
    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    /// The deterministic stake account for `participant`.
    pub fn stake_account_of(&self, participant: &Address) -> Address {
        derive_address(
            STAKE_ACCOUNT_DOMAIN,
            &[self.address.as_bytes(), participant.as_bytes()],
        )
    }

    /// The cached active set, highest stake first.
    pub fn active_set(&self) -> &[Address] {
        &self.active_set
    }

    /// The first `limit` members of the active set.
    pub fn active_set_limited(&self, limit: usize) -> &[Address] {
        &self.active_set[..limit.min(self.active_set.len())]
    }

    /// Current active-set size.
    pub fn active_set_size(&self) -> usize {
        self.active_set.len()
    }

    /// Whether `address` is in the active set.
    pub fn is_active(&self, address: &Address) -> bool {
        self.active_set.contains(address)
    }

    /// Whether `address` is a registered participant with status Active.
    pub fn is_active_participant(&self, address: &Address) -> bool {
        self.participants
            .get(address)
            .is_some_and(|p| p.status == ParticipantStatus::Active)
    }

    /// Events emitted since the last drain.
    pub fn events_mut(&mut self) -> &mut EventBuffer {
        &mut self.events
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn get(&self, participant: &Address) -> Result<&Participant, StakingError> {
        self.participants
            .get(participant)
            .ok_or(StakingError::NotFound {
                participant: *participant,
            })
    }

    fn get_mut(&mut self, participant: &Address) -> Result<&mut Participant, StakingError> {
        self.participants
            .get_mut(participant)
            .ok_or(StakingError::NotFound {
                participant: *participant,
            })
    }

    fn refresh_active_set(&mut self) {
        let next = select_active_set(
            self.registration_order
                .iter()
                .filter_map(|a| self.participants.get(a)),
            self.config.min_stake,
            self.config.max_active_validators,
        );
        if next != self.active_set {
            tracing::debug!(size = next.len(), "active set recomputed");
            self.active_set = next;
            self.events.emit(ProtocolEvent::ActiveSetUpdated {
                members: self.active_set.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_core::ErrorCategory;
    use vouch_token::InMemoryToken;

    const LEDGER: Address = Address::from_bytes([0x5e; 20]);
    const ADMIN: Address = Address::from_bytes([0xad; 20]);
    const TREASURY: Address = Address::from_bytes([0x7e; 20]);
    const SLASHER: Address = Address::from_bytes([0x51; 20]);

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    fn ctx(caller: Address, now: u64) -> CallContext {
        CallContext::new(caller, Tick::new(now))
    }

    fn setup() -> (StakeLedger, InMemoryToken) {
        let config = StakingConfig {
            min_stake: 1000,
            max_active_validators: 3,
            bonding_period: 10,
        };
        let mut ledger = StakeLedger::new(LEDGER, ADMIN, TREASURY, config).unwrap();
        ledger
            .grant_role(&ctx(ADMIN, 0), Role::Slasher, SLASHER)
            .unwrap();
        ledger.events_mut().drain();
        let mut token = InMemoryToken::new(ADMIN, 1_000_000_000);
        for b in 1..=9 {
            token.mint(&ADMIN, &addr(b), 100_000).unwrap();
            token.approve(&addr(b), &LEDGER, 100_000);
        }
        (ledger, token)
    }

    #[test]
    fn register_moves_tokens_into_stake_account() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 3000).unwrap();
        let account = ledger.stake_account_of(&addr(1));
        assert_eq!(token.balance_of(&account), 3000);
        assert_eq!(token.balance_of(&addr(1)), 97_000);
        let p = ledger.participant(&addr(1)).unwrap();
        assert_eq!(p.stake, 3000);
        assert_eq!(p.status, ParticipantStatus::Active);
        assert_eq!(ledger.total_staked(), 3000);
        assert_eq!(ledger.active_set(), &[addr(1)]);
    }

    #[test]
    fn register_below_minimum_fails() {
        let (mut ledger, mut token) = setup();
        let err = ledger.register(&ctx(addr(1), 0), &mut token, 999).unwrap_err();
        assert_eq!(
            err,
            StakingError::InsufficientStake {
                required: 1000,
                actual: 999
            }
        );
        assert!(ledger.participant(&addr(1)).is_none());
    }

    #[test]
    fn duplicate_register_fails() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1000).unwrap();
        let err = ledger.register(&ctx(addr(1), 1), &mut token, 1000).unwrap_err();
        assert_eq!(err, StakingError::AlreadyRegistered { participant: addr(1) });
    }

    #[test]
    fn register_without_allowance_changes_nothing() {
        let (mut ledger, mut token) = setup();
        token.approve(&addr(1), &LEDGER, 0);
        let err = ledger.register(&ctx(addr(1), 0), &mut token, 1000).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::External);
        assert!(ledger.participant(&addr(1)).is_none());
        assert_eq!(ledger.total_staked(), 0);
        assert!(ledger.events_mut().is_empty());
    }

    #[test]
    fn deposit_dispatches() {
        let (mut ledger, mut token) = setup();
        ledger.deposit(&ctx(addr(1), 0), &mut token, 1000).unwrap();
        ledger.deposit(&ctx(addr(1), 1), &mut token, 500).unwrap();
        assert_eq!(ledger.stake_of(&addr(1)), 1500);
        let names: Vec<_> = ledger.events_mut().drain().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["participant_registered", "active_set_updated", "stake_increased"]
        );
    }

    #[test]
    fn withdrawal_full_cycle() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 3000).unwrap();
        let available = ledger
            .request_withdrawal(&ctx(addr(1), 5), 1000)
            .unwrap();
        assert_eq!(available, Tick::new(15));
        assert_eq!(ledger.stake_of(&addr(1)), 2000);
        assert_eq!(ledger.total_staked(), 2000);

        let err = ledger
            .complete_withdrawal(&ctx(addr(1), 14), &mut token)
            .unwrap_err();
        assert!(matches!(err, StakingError::BondingPeriodNotMet { .. }));

        let paid = ledger
            .complete_withdrawal(&ctx(addr(1), 15), &mut token)
            .unwrap();
        assert_eq!(paid, 1000);
        assert_eq!(token.balance_of(&addr(1)), 98_000);
        let p = ledger.participant(&addr(1)).unwrap();
        assert_eq!(p.status, ParticipantStatus::Active);
        assert!(p.pending_withdrawal.is_none());
    }

    #[test]
    fn full_withdrawal_goes_unstaking_then_inactive() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 2000).unwrap();
        ledger.request_withdrawal(&ctx(addr(1), 0), 2000).unwrap();
        assert_eq!(
            ledger.participant(&addr(1)).unwrap().status,
            ParticipantStatus::Unstaking
        );
        assert!(ledger.active_set().is_empty());
        ledger
            .complete_withdrawal(&ctx(addr(1), 10), &mut token)
            .unwrap();
        assert_eq!(
            ledger.participant(&addr(1)).unwrap().status,
            ParticipantStatus::Inactive
        );
        assert_eq!(token.balance_of(&addr(1)), 100_000);
    }

    #[test]
    fn dust_remainder_rejected() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1500).unwrap();
        let err = ledger.request_withdrawal(&ctx(addr(1), 0), 501).unwrap_err();
        assert_eq!(
            err,
            StakingError::InsufficientStake {
                required: 1000,
                actual: 999
            }
        );
    }

    #[test]
    fn withdrawal_error_cases() {
        let (mut ledger, mut token) = setup();
        assert!(matches!(
            ledger.request_withdrawal(&ctx(addr(1), 0), 1),
            Err(StakingError::NotFound { .. })
        ));
        ledger.register(&ctx(addr(1), 0), &mut token, 2000).unwrap();
        assert_eq!(
            ledger.request_withdrawal(&ctx(addr(1), 0), 0),
            Err(StakingError::ZeroAmount)
        );
        assert_eq!(
            ledger.request_withdrawal(&ctx(addr(1), 0), 2001),
            Err(StakingError::ExceedsStake {
                requested: 2001,
                staked: 2000
            })
        );
        ledger.request_withdrawal(&ctx(addr(1), 0), 1000).unwrap();
        assert_eq!(
            ledger.request_withdrawal(&ctx(addr(1), 0), 1000),
            Err(StakingError::WithdrawalPending { participant: addr(1) })
        );
        assert!(matches!(
            ledger.complete_withdrawal(&ctx(addr(2), 0), &mut token),
            Err(StakingError::NotFound { .. })
        ));
    }

    #[test]
    fn unstaking_participant_cannot_request_again() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1000).unwrap();
        ledger.request_withdrawal(&ctx(addr(1), 0), 1000).unwrap();
        ledger
            .complete_withdrawal(&ctx(addr(1), 10), &mut token)
            .unwrap();
        let err = ledger.request_withdrawal(&ctx(addr(1), 11), 1).unwrap_err();
        assert!(matches!(
            err,
            StakingError::NotActive {
                status: ParticipantStatus::Inactive,
                ..
            }
        ));
    }

    #[test]
    fn complete_without_request_fails() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1000).unwrap();
        assert_eq!(
            ledger.complete_withdrawal(&ctx(addr(1), 100), &mut token),
            Err(StakingError::NoPendingWithdrawal { participant: addr(1) })
        );
    }

    #[test]
    fn slash_requires_role() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1000).unwrap();
        let err = ledger
            .slash(&ctx(addr(2), 0), &mut token, &addr(1), 10, "test")
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Authorization);
    }

    #[test]
    fn slash_caps_at_stake_and_pays_treasury() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1200).unwrap();
        let applied = ledger
            .slash(&ctx(SLASHER, 1), &mut token, &addr(1), 5000, "fraud")
            .unwrap();
        assert_eq!(applied, 1200);
        assert_eq!(ledger.stake_of(&addr(1)), 0);
        assert_eq!(token.balance_of(&TREASURY), 1200);
        assert_eq!(
            ledger.participant(&addr(1)).unwrap().status,
            ParticipantStatus::Inactive
        );
        assert!(ledger.active_set().is_empty());
    }

    #[test]
    fn slash_below_minimum_marks_slashed() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1200).unwrap();
        let applied = ledger
            .slash(&ctx(SLASHER, 1), &mut token, &addr(1), 300, "late")
            .unwrap();
        assert_eq!(applied, 300);
        let p = ledger.participant(&addr(1)).unwrap();
        assert_eq!(p.status, ParticipantStatus::Slashed);
        assert_eq!(p.stake, 900);
        assert!(!ledger.is_active(&addr(1)));
    }

    #[test]
    fn slash_above_minimum_keeps_status() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 3000).unwrap();
        ledger
            .slash(&ctx(SLASHER, 1), &mut token, &addr(1), 20, "minor")
            .unwrap();
        assert_eq!(
            ledger.participant(&addr(1)).unwrap().status,
            ParticipantStatus::Active
        );
    }

    #[test]
    fn slashing_an_emptied_stake_changes_nothing() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 2000).unwrap();
        ledger.request_withdrawal(&ctx(addr(1), 0), 2000).unwrap();
        ledger.events_mut().drain();

        assert_eq!(
            ledger.slash_preview(&ctx(SLASHER, 1), &addr(1), 500),
            Ok(0)
        );
        let applied = ledger
            .slash(&ctx(SLASHER, 1), &mut token, &addr(1), 500, "late")
            .unwrap();
        assert_eq!(applied, 0);
        assert_eq!(
            ledger.participant(&addr(1)).unwrap().status,
            ParticipantStatus::Unstaking
        );
        assert!(ledger.events_mut().is_empty());
        assert_eq!(token.balance_of(&TREASURY), 0);
    }

    #[test]
    fn slash_preview_matches_slash_and_touches_nothing() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1200).unwrap();
        assert_eq!(
            ledger
                .slash_preview(&ctx(addr(2), 1), &addr(1), 10)
                .unwrap_err()
                .category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            ledger.slash_preview(&ctx(SLASHER, 1), &addr(1), 0),
            Err(StakingError::ZeroAmount)
        );
        let preview = ledger
            .slash_preview(&ctx(SLASHER, 1), &addr(1), 5000)
            .unwrap();
        assert_eq!(preview, 1200);
        assert_eq!(ledger.stake_of(&addr(1)), 1200);
        let applied = ledger
            .slash(&ctx(SLASHER, 1), &mut token, &addr(1), 5000, "fraud")
            .unwrap();
        assert_eq!(applied, preview);
    }

    #[test]
    fn slash_leaves_pending_withdrawal_alone() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 3000).unwrap();
        ledger.request_withdrawal(&ctx(addr(1), 0), 1000).unwrap();
        let applied = ledger
            .slash(&ctx(SLASHER, 1), &mut token, &addr(1), 10_000, "fraud")
            .unwrap();
        assert_eq!(applied, 2000);
        let paid = ledger
            .complete_withdrawal(&ctx(addr(1), 10), &mut token)
            .unwrap();
        assert_eq!(paid, 1000);
        assert_eq!(
            ledger.participant(&addr(1)).unwrap().status,
            ParticipantStatus::Inactive
        );
    }

    #[test]
    fn slashed_participant_reactivates_on_top_up() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1000).unwrap();
        ledger
            .slash(&ctx(SLASHER, 1), &mut token, &addr(1), 100, "late")
            .unwrap();
        ledger.increase_stake(&ctx(addr(1), 2), &mut token, 50).unwrap();
        assert_eq!(
            ledger.participant(&addr(1)).unwrap().status,
            ParticipantStatus::Slashed
        );
        ledger.increase_stake(&ctx(addr(1), 3), &mut token, 50).unwrap();
        assert_eq!(
            ledger.participant(&addr(1)).unwrap().status,
            ParticipantStatus::Active
        );
        assert!(ledger.is_active(&addr(1)));
    }

    #[test]
    fn inactive_top_up_below_minimum_fails() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1000).unwrap();
        ledger
            .slash(&ctx(SLASHER, 1), &mut token, &addr(1), 1000, "fraud")
            .unwrap();
        assert!(matches!(
            ledger.increase_stake(&ctx(addr(1), 2), &mut token, 999),
            Err(StakingError::InsufficientStake { .. })
        ));
        ledger.increase_stake(&ctx(addr(1), 2), &mut token, 1000).unwrap();
        assert!(ledger.is_active(&addr(1)));
    }

    #[test]
    fn active_set_ranked_and_limited() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1000).unwrap();
        ledger.register(&ctx(addr(2), 0), &mut token, 3000).unwrap();
        ledger.register(&ctx(addr(3), 0), &mut token, 2000).unwrap();
        ledger.register(&ctx(addr(4), 0), &mut token, 2000).unwrap();
        assert_eq!(ledger.active_set(), &[addr(2), addr(3), addr(4)]);
        assert_eq!(ledger.active_set_limited(2), &[addr(2), addr(3)]);
        assert_eq!(ledger.active_set_limited(10).len(), 3);
        assert!(!ledger.is_active(&addr(1)));
        assert!(ledger.is_active_participant(&addr(1)));
    }

    #[test]
    fn admin_limit_change_recomputes() {
        let (mut ledger, mut token) = setup();
        for b in 1..=4 {
            ledger
                .register(&ctx(addr(b), 0), &mut token, 1000 * b as Amount)
                .unwrap();
        }
        assert_eq!(ledger.active_set_size(), 3);
        ledger
            .set_max_active_validators(&ctx(ADMIN, 1), 1)
            .unwrap();
        assert_eq!(ledger.active_set(), &[addr(4)]);
        assert!(ledger.set_max_active_validators(&ctx(ADMIN, 1), 0).is_err());
        assert!(ledger.set_max_active_validators(&ctx(addr(1), 1), 5).is_err());
    }

    #[test]
    fn raising_minimum_drops_members() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 1000).unwrap();
        ledger.register(&ctx(addr(2), 0), &mut token, 5000).unwrap();
        ledger.set_min_stake(&ctx(ADMIN, 1), 2000).unwrap();
        assert_eq!(ledger.active_set(), &[addr(2)]);
    }

    #[test]
    fn custody_matches_ledger() {
        let (mut ledger, mut token) = setup();
        ledger.register(&ctx(addr(1), 0), &mut token, 3000).unwrap();
        ledger.request_withdrawal(&ctx(addr(1), 0), 1000).unwrap();
        ledger
            .slash(&ctx(SLASHER, 1), &mut token, &addr(1), 500, "x")
            .unwrap();
        let p = ledger.participant(&addr(1)).unwrap();
        assert_eq!(token.balance_of(&p.stake_account), p.custody());
    }
}
