//! In-memory custody ledger.

use dashmap::DashMap;
use tracing::debug;

use crate::domain::{AccountId, Amount, Balance, ExchangeError};
use crate::port::{DepositRejected, Ledger};

/// Account balances held in a concurrent map.
///
/// Funds enter through [`InMemoryLedger::mint`]; everything else moves value
/// between accounts and [`Balance`]s without creating or destroying it.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: DashMap<AccountId, Amount>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit freshly issued funds to `owner`.
    ///
    /// # Errors
    ///
    /// `AccountOverflow` if the account cannot hold `amount` more.
    pub fn mint(&self, owner: &AccountId, amount: Amount) -> Result<(), ExchangeError> {
        debug!(owner = %owner, amount, "Minting funds");
        self.deposit(owner, Balance::from_value(amount))
            .map_err(|rejected| rejected.error)
    }

    /// Sum of all account balances.
    #[must_use]
    pub fn total(&self) -> u128 {
        self.accounts
            .iter()
            .map(|entry| u128::from(*entry.value()))
            .sum()
    }
}

impl Ledger for InMemoryLedger {
    fn withdraw(&self, owner: &AccountId, amount: Amount) -> Result<Balance, ExchangeError> {
        if amount == 0 {
            return Ok(Balance::zero());
        }
        let Some(mut held) = self.accounts.get_mut(owner) else {
            return Err(ExchangeError::InsufficientFunds {
                owner: owner.clone(),
                required: amount,
                available: 0,
            });
        };
        if *held < amount {
            return Err(ExchangeError::InsufficientFunds {
                owner: owner.clone(),
                required: amount,
                available: *held,
            });
        }
        *held -= amount;
        Ok(Balance::from_value(amount))
    }

    fn deposit(&self, owner: &AccountId, funds: Balance) -> Result<(), DepositRejected> {
        let mut held = self.accounts.entry(owner.clone()).or_insert(0);
        match held.checked_add(funds.value()) {
            Some(total) => {
                *held = total;
                let _ = funds.into_value();
                Ok(())
            }
            None => Err(DepositRejected {
                error: ExchangeError::AccountOverflow {
                    owner: owner.clone(),
                    held: *held,
                    incoming: funds.value(),
                },
                funds,
            }),
        }
    }

    fn balance_of(&self, owner: &AccountId) -> Amount {
        self.accounts.get(owner).map_or(0, |held| *held)
    }
}
