//! # In-Memory Token
//!
//! A capped-supply token with a single authorized minter. Balances and
//! allowances live in ordered maps so iteration (and therefore any debug
//! output) is deterministic.

use std::collections::BTreeMap;

use vouch_core::{Address, Amount};

use crate::error::TokenError;
use crate::ledger::TokenLedger;

/// Capped-supply fungible token.
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    minter: Address,
    max_supply: Amount,
    total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<(Address, Address), Amount>,
}

impl InMemoryToken {
    /// Create an empty token that only `minter` can mint, capped at
    /// `max_supply`.
    pub fn new(minter: Address, max_supply: Amount) -> Self {
        Self {
            minter,
            max_supply,
            total_supply: 0,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    /// The authorized minter.
    pub fn minter(&self) -> Address {
        self.minter
    }

    /// The supply cap.
    pub fn max_supply(&self) -> Amount {
        self.max_supply
    }

    /// Tokens currently in existence.
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Create `amount` new tokens in `to`.
    pub fn mint(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        if *caller != self.minter {
            return Err(TokenError::NotMinter { caller: *caller });
        }
        if to.is_zero() {
            return Err(TokenError::ZeroAddress { role: "recipient" });
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .filter(|s| *s <= self.max_supply)
            .ok_or(TokenError::MaxSupplyExceeded {
                max_supply: self.max_supply,
                total_supply: self.total_supply,
                requested: amount,
            })?;
        self.credit(to, amount)?;
        self.total_supply = new_supply;
        tracing::debug!(%to, amount, total_supply = new_supply, "minted");
        Ok(())
    }

    /// Destroy `amount` of `from`'s tokens.
    pub fn burn(&mut self, from: &Address, amount: Amount) -> Result<(), TokenError> {
        self.debit(from, amount)?;
        self.total_supply = self.total_supply.saturating_sub(amount);
        tracing::debug!(%from, amount, total_supply = self.total_supply, "burned");
        Ok(())
    }

    /// Set the amount `spender` may move out of `owner`.
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
    }

    fn debit(&mut self, account: &Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balance_of(account);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                account: *account,
                balance,
                required: amount,
            })?;
        if remaining == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, remaining);
        }
        Ok(())
    }

    fn credit(&mut self, account: &Address, amount: Amount) -> Result<(), TokenError> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.balances.entry(*account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }
}

impl TokenLedger for InMemoryToken {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        if from.is_zero() {
            return Err(TokenError::ZeroAddress { role: "sender" });
        }
        if to.is_zero() {
            return Err(TokenError::ZeroAddress { role: "recipient" });
        }
        if from == to {
            // Still fails if the balance cannot cover it.
            let balance = self.balance_of(from);
            if balance < amount {
                return Err(TokenError::InsufficientBalance {
                    account: *from,
                    balance,
                    required: amount,
                });
            }
            return Ok(());
        }
        self.debit(from, amount)?;
        if let Err(e) = self.credit(to, amount) {
            // Undo the debit so a failed transfer changes nothing.
            let restored = self.balance_of(from).saturating_add(amount);
            self.balances.insert(*from, restored);
            return Err(e);
        }
        tracing::trace!(%from, %to, amount, "transfer");
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                allowance,
                required: amount,
            });
        }
        self.transfer(from, to, amount)?;
        self.approve(from, spender, allowance - amount);
        Ok(())
    }
}
