//! Custody ledger port.
//!
//! The exchange pulls stakes and seed liquidity out of an account with
//! [`Ledger::withdraw`] and pays winners with [`Ledger::deposit`]. What an
//! account *is* (wallet, sub-ledger, on-chain address) is up to the adapter;
//! the engine only sees [`Balance`] values.

use thiserror::Error;

use crate::domain::{AccountId, Amount, Balance, ExchangeError};

/// A credit the ledger refused. The funds come back to the caller.
#[derive(Debug, Error)]
#[error("deposit of {} rejected: {error}", funds.value())]
pub struct DepositRejected {
    pub funds: Balance,
    #[source]
    pub error: ExchangeError,
}

impl DepositRejected {
    /// Split into the returned funds and the reason.
    #[must_use]
    pub fn into_parts(self) -> (Balance, ExchangeError) {
        (self.funds, self.error)
    }
}

/// Fungible balance custody.
pub trait Ledger: Send + Sync {
    /// Take `amount` out of `owner`'s account.
    ///
    /// # Errors
    ///
    /// `InsufficientFunds` when the account holds less than `amount`. The
    /// account must be left untouched on error.
    fn withdraw(&self, owner: &AccountId, amount: Amount) -> Result<Balance, ExchangeError>;

    /// Credit `funds` to `owner`'s account.
    ///
    /// # Errors
    ///
    /// `AccountOverflow` when the account cannot hold the extra value. The
    /// account is left untouched and the funds are handed back.
    fn deposit(&self, owner: &AccountId, funds: Balance) -> Result<(), DepositRejected>;

    /// Current value held by `owner`.
    fn balance_of(&self, owner: &AccountId) -> Amount;
}
