//! # Dispute Game
//!
//! The game's own address doubles as its bond escrow account and as the
//! verifying contract in the dispute vote domain. To slash proposers it must
//! hold [`Role::Slasher`] on the stake ledger.
//!
//! Resolution either completes or leaves everything as it was. Escrow payouts
//! run first and are returned to escrow if a later step fails; the proposer's
//! slash is committed last, after a preview with the same checks.

use std::collections::BTreeMap;

use vouch_core::{
    AccessControl, Address, Amount, CallContext, DisputeId, EventBuffer, ProposalId,
    ProtocolEvent, Role, VoteSubject,
};
use vouch_crypto::{verify_vote, VoteDomain, VoteMessage, VoteSignature};
use vouch_proposal::ProposalStore;
use vouch_staking::StakeLedger;
use vouch_token::TokenLedger;

use crate::config::DisputeConfig;
use crate::dispute::{Dispute, DisputeState, DisputeVote};
use crate::error::DisputeError;
use crate::outcome::{challenger_wins, compute_slash, Settlement};

/// Bonded disputes over optimistically approved proposals.
#[derive(Debug, Clone)]
pub struct DisputeGame {
    address: Address,
    chain_id: u64,
    config: DisputeConfig,
    access: AccessControl,
    next_id: DisputeId,
    disputes: BTreeMap<DisputeId, Dispute>,
    by_proposal: BTreeMap<ProposalId, Vec<DisputeId>>,
    /// Sum of the bonds of every active dispute.
    escrowed: Amount,
    events: EventBuffer,
}

impl DisputeGame {
    /// Create a game at `address` on `chain_id`, administered by `admin`.
    pub fn new(
        address: Address,
        admin: Address,
        chain_id: u64,
        config: DisputeConfig,
    ) -> Result<Self, DisputeError> {
        config.validate().map_err(DisputeError::InvalidConfig)?;
        Ok(Self {
            address,
            chain_id,
            config,
            access: AccessControl::new(admin),
            next_id: DisputeId::FIRST,
            disputes: BTreeMap::new(),
            by_proposal: BTreeMap::new(),
            escrowed: 0,
            events: EventBuffer::new(),
        })
    }

    /// Contest `proposal_id`, escrowing `bond` from the caller.
    ///
    /// The game must be approved to spend the bond on the caller's behalf.
    pub fn open<T: TokenLedger + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        stakes: &StakeLedger,
        proposals: &ProposalStore,
        proposal_id: ProposalId,
        bond: Amount,
    ) -> Result<DisputeId, DisputeError> {
        let challenger = ctx.caller;
        if !stakes.is_active(&challenger) {
            return Err(DisputeError::NotActiveParticipant { caller: challenger });
        }
        if bond == 0 {
            return Err(DisputeError::ZeroBond);
        }
        if bond < self.config.min_bond {
            return Err(DisputeError::BelowMinimumBond {
                minimum: self.config.min_bond,
                bond,
            });
        }
        let proposer = proposals
            .ensure_challengeable(proposal_id, ctx.now)
            .map_err(|reason| DisputeError::NotDisputable {
                proposal_id,
                reason,
            })?
            .proposer;
        let id = self.next_id;
        let next_id = id.checked_next().ok_or(DisputeError::Overflow)?;
        let voting_end = ctx
            .now
            .checked_add(self.config.voting_period)
            .ok_or(DisputeError::Overflow)?;
        let escrowed = self.escrowed.checked_add(bond).ok_or(DisputeError::Overflow)?;

        token.transfer_from(&self.address, &challenger, &self.address, bond)?;

        self.next_id = next_id;
        self.escrowed = escrowed;
        self.disputes.insert(
            id,
            Dispute {
                id,
                proposal_id,
                challenger,
                proposer,
                bond,
                state: DisputeState::Active,
                created_at: ctx.now,
                voting_end,
                votes_for: 0,
                votes_against: 0,
                challenger_won: None,
                slash_amount: 0,
                votes: BTreeMap::new(),
                transition_log: Vec::new(),
            },
        );
        self.by_proposal.entry(proposal_id).or_default().push(id);
        tracing::info!(
            dispute_id = %id,
            %proposal_id,
            %challenger,
            %proposer,
            bond,
            %voting_end,
            "dispute opened"
        );
        self.events.emit(ProtocolEvent::DisputeOpened {
            dispute_id: id,
            proposal_id,
            challenger,
            bond,
        });
        Ok(id)
    }

    /// Cast the caller's signed vote. `support` backs the challenger.
    pub fn vote(
        &mut self,
        ctx: &CallContext,
        stakes: &StakeLedger,
        dispute_id: DisputeId,
        support: bool,
        signature: VoteSignature,
    ) -> Result<(), DisputeError> {
        let voter = ctx.caller;
        let dispute = self.get(dispute_id)?;
        if !stakes.is_active(&voter) {
            return Err(DisputeError::NotActiveParticipant { caller: voter });
        }
        if dispute.state != DisputeState::Active {
            return Err(DisputeError::NotActive {
                dispute_id,
                state: dispute.state,
            });
        }
        if ctx.now.is_after(dispute.voting_end) {
            return Err(DisputeError::VotingEnded {
                dispute_id,
                voting_end: dispute.voting_end,
                now: ctx.now,
            });
        }
        if dispute.has_voted(&voter) {
            return Err(DisputeError::AlreadyVoted { dispute_id, voter });
        }
        verify_vote(&self.vote_message(dispute_id, voter, support), &signature)
            .map_err(DisputeError::InvalidSignature)?;
        let (votes_for, votes_against) = if support {
            (
                dispute.votes_for.checked_add(1).ok_or(DisputeError::Overflow)?,
                dispute.votes_against,
            )
        } else {
            (
                dispute.votes_for,
                dispute
                    .votes_against
                    .checked_add(1)
                    .ok_or(DisputeError::Overflow)?,
            )
        };

        let dispute = self.get_mut(dispute_id)?;
        dispute.votes_for = votes_for;
        dispute.votes_against = votes_against;
        dispute.votes.insert(
            voter,
            DisputeVote {
                support,
                signature,
                cast_at: ctx.now,
            },
        );
        tracing::info!(%dispute_id, %voter, support, votes_for, votes_against, "dispute vote cast");
        self.events.emit(ProtocolEvent::VoteCast {
            subject: VoteSubject::Dispute(dispute_id),
            voter,
            support,
        });
        Ok(())
    }

    /// Tally a dispute strictly after its window and settle the bond.
    ///
    /// On a challenger win the proposer is slashed through `stakes` and the
    /// bond is refunded. On a loss the slash is taken from the bond and sent
    /// to the ledger's treasury.
    pub fn resolve<T: TokenLedger + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        stakes: &mut StakeLedger,
        dispute_id: DisputeId,
    ) -> Result<Settlement, DisputeError> {
        let dispute = self.get(dispute_id)?;
        if dispute.state != DisputeState::Active {
            return Err(DisputeError::NotActive {
                dispute_id,
                state: dispute.state,
            });
        }
        if !ctx.now.is_after(dispute.voting_end) {
            return Err(DisputeError::VotingActive {
                dispute_id,
                voting_end: dispute.voting_end,
                now: ctx.now,
            });
        }
        let (challenger, proposer, bond) = (dispute.challenger, dispute.proposer, dispute.bond);
        let active_set_size = stakes.active_set_size();
        let won = challenger_wins(dispute.votes_for, active_set_size);
        let proposer_stake = stakes
            .is_active_participant(&proposer)
            .then(|| stakes.stake_of(&proposer));
        let slash = compute_slash(bond, self.config.slash_pct, proposer_stake)
            .ok_or(DisputeError::Overflow)?;

        // Payouts come out of the pooled escrow, which must still cover
        // every active bond.
        let available = token.balance_of(&self.address);
        if available < self.escrowed {
            return Err(DisputeError::EscrowShortfall {
                required: self.escrowed,
                available,
            });
        }

        let as_game = CallContext::new(self.address, ctx.now);
        let settlement = if won {
            let applied = if slash > 0 {
                stakes.slash_preview(&as_game, &proposer, slash)?
            } else {
                0
            };
            Settlement::split(bond, true, applied).ok_or(DisputeError::Overflow)?
        } else {
            Settlement::split(bond, false, slash).ok_or(DisputeError::Overflow)?
        };
        let treasury = stakes.treasury();
        let payouts = [
            (treasury, settlement.treasury_payout),
            (challenger, settlement.challenger_payout),
        ];
        let mut paid = Vec::with_capacity(payouts.len());
        for (recipient, amount) in payouts {
            if amount == 0 {
                continue;
            }
            if let Err(err) = token.transfer(&self.address, &recipient, amount) {
                self.return_to_escrow(token, dispute_id, &paid);
                return Err(err.into());
            }
            paid.push((recipient, amount));
        }
        if won && settlement.slash_amount > 0 {
            let reason = format!("lost {dispute_id}");
            if let Err(err) =
                stakes.slash(&as_game, token, &proposer, settlement.slash_amount, &reason)
            {
                self.return_to_escrow(token, dispute_id, &paid);
                return Err(err.into());
            }
        }
        self.escrowed = self.escrowed.saturating_sub(bond);

        let dispute = self.get_mut(dispute_id)?;
        dispute.challenger_won = Some(won);
        dispute.slash_amount = settlement.slash_amount;
        let reason = if won {
            "challenger won"
        } else {
            "proposer won"
        };
        dispute.transition(DisputeState::VotingComplete, ctx.now, "voting closed");
        dispute.transition(DisputeState::Resolved, ctx.now, reason);
        let (votes_for, votes_against) = (dispute.votes_for, dispute.votes_against);
        tracing::info!(
            %dispute_id,
            challenger_won = won,
            votes_for,
            votes_against,
            active_set_size,
            slash_amount = settlement.slash_amount,
            "dispute resolved"
        );
        if settlement.challenger_payout > 0 {
            self.events.emit(ProtocolEvent::RewardDistributed {
                dispute_id,
                recipient: challenger,
                amount: settlement.challenger_payout,
            });
        }
        if settlement.treasury_payout > 0 {
            self.events.emit(ProtocolEvent::RewardDistributed {
                dispute_id,
                recipient: treasury,
                amount: settlement.treasury_payout,
            });
        }
        self.events.emit(ProtocolEvent::DisputeResolved {
            dispute_id,
            challenger_won: won,
            slash_amount: settlement.slash_amount,
        });
        Ok(settlement)
    }

    /// Cancel an active dispute and refund its bond. Operator only.
    pub fn cancel<T: TokenLedger + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut T,
        dispute_id: DisputeId,
        reason: &str,
    ) -> Result<(), DisputeError> {
        self.access.require(Role::Operator, &ctx.caller)?;
        let dispute = self.get(dispute_id)?;
        if dispute.state != DisputeState::Active {
            return Err(DisputeError::InvalidState {
                dispute_id,
                state: dispute.state,
            });
        }
        let (challenger, bond) = (dispute.challenger, dispute.bond);

        token.transfer(&self.address, &challenger, bond)?;
        self.escrowed = self.escrowed.saturating_sub(bond);

        let dispute = self.get_mut(dispute_id)?;
        dispute.transition(DisputeState::Cancelled, ctx.now, reason);
        tracing::info!(%dispute_id, %challenger, bond, reason, "dispute cancelled");
        self.events.emit(ProtocolEvent::RewardDistributed {
            dispute_id,
            recipient: challenger,
            amount: bond,
        });
        self.events.emit(ProtocolEvent::DisputeCancelled {
            dispute_id,
            reason: reason.to_string(),
        });
        Ok(())
    }

    // ── Administration ─────────────────────────────────────────────────

    /// Change the minimum bond for future disputes. Admin only.
    pub fn set_min_bond(&mut self, ctx: &CallContext, min_bond: Amount) -> Result<(), DisputeError> {
        self.access.require_admin(&ctx.caller)?;
        self.config.min_bond = min_bond;
        tracing::info!(min_bond, "minimum bond updated");
        Ok(())
    }

    /// Grant `role` to `account`. Admin only.
    pub fn grant_role(
        &mut self,
        ctx: &CallContext,
        role: Role,
        account: Address,
    ) -> Result<(), DisputeError> {
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
    ) -> Result<(), DisputeError> {
        if self.access.revoke(&ctx.caller, role, &account)? {
            self.events.emit(ProtocolEvent::RoleRevoked { role, account });
        }
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// The game's identity and escrow account.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Bonds held for active disputes.
    pub fn escrowed(&self) -> Amount {
        self.escrowed
    }

    /// One dispute.
    pub fn dispute(&self, dispute_id: DisputeId) -> Option<&Dispute> {
        self.disputes.get(&dispute_id)
    }

    /// Every dispute opened against `proposal_id`, oldest first.
    pub fn disputes_for(&self, proposal_id: ProposalId) -> &[DisputeId] {
        self.by_proposal
            .get(&proposal_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The vote `voter` cast on `dispute_id`, if any.
    pub fn vote_of(&self, dispute_id: DisputeId, voter: &Address) -> Option<&DisputeVote> {
        self.disputes.get(&dispute_id)?.votes.get(voter)
    }

    /// The message a voter must sign for `dispute_id`.
    pub fn vote_message(&self, dispute_id: DisputeId, voter: Address, support: bool) -> VoteMessage {
        VoteMessage {
            domain: VoteDomain::dispute(self.address, self.chain_id),
            id: dispute_id.value(),
            voter,
            support,
        }
    }

    /// Current parameters.
    pub fn config(&self) -> &DisputeConfig {
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

    /// Pull completed payouts back into escrow, newest first.
    fn return_to_escrow<T: TokenLedger + ?Sized>(
        &self,
        token: &mut T,
        dispute_id: DisputeId,
        paid: &[(Address, Amount)],
    ) {
        for (recipient, amount) in paid.iter().rev() {
            if let Err(err) = token.transfer(recipient, &self.address, *amount) {
                tracing::error!(
                    %dispute_id,
                    %recipient,
                    amount,
                    error = %err,
                    "payout could not be returned to escrow"
                );
            }
        }
    }

    fn get(&self, dispute_id: DisputeId) -> Result<&Dispute, DisputeError> {
        self.disputes
            .get(&dispute_id)
            .ok_or(DisputeError::NotFound { dispute_id })
    }

    fn get_mut(&mut self, dispute_id: DisputeId) -> Result<&mut Dispute, DisputeError> {
        self.disputes
            .get_mut(&dispute_id)
            .ok_or(DisputeError::NotFound { dispute_id })
    }
}
