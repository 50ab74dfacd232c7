//! # Token Ledger Interface

use vouch_core::{Address, Amount};

use crate::error::TokenError;

/// A fungible token with transfer and allowance semantics.
///
/// Protocol components call [`transfer`](TokenLedger::transfer) only for
/// accounts they custody (a stake account, the dispute escrow), and
/// [`transfer_from`](TokenLedger::transfer_from) to pull funds a user has
/// approved them to spend.
pub trait TokenLedger {
    /// Current balance of `account`.
    fn balance_of(&self, account: &Address) -> Amount;

    /// Amount `spender` may still move out of `owner`.
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    /// Move `amount` from `from` to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;
}
