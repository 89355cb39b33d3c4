//! Move-only fungible balance.
//!
//! A [`Balance`] is the in-process stand-in for custodied funds. It is not
//! `Clone`: value moves between owners by `join`/`split`, so the engine can
//! never duplicate funds by copying a record.

use super::error::ExchangeError;
use super::money::Amount;

/// A quantity of the custodied asset.
#[derive(Debug, PartialEq, Eq, Default)]
#[must_use = "dropping a Balance destroys the funds it holds"]
pub struct Balance {
    value: Amount,
}

impl Balance {
    /// An empty balance.
    pub const fn zero() -> Self {
        Self { value: 0 }
    }

    /// Materialise funds. Reserved for custody implementations.
    pub const fn from_value(value: Amount) -> Self {
        Self { value }
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> Amount {
        self.value
    }

    /// Destroy the balance, returning its value to the custody implementation.
    #[must_use]
    pub const fn into_value(self) -> Amount {
        self.value
    }

    /// Absorb `other` into this balance.
    pub fn join(&mut self, other: Balance) -> Result<(), ExchangeError> {
        self.value = self
            .value
            .checked_add(other.into_value())
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Take `amount` out of this balance.
    pub fn split(&mut self, amount: Amount) -> Result<Balance, ExchangeError> {
        if amount > self.value {
            return Err(ExchangeError::InsufficientCustody {
                required: amount,
                available: self.value,
            });
        }
        self.value -= amount;
        Ok(Balance::from_value(amount))
    }
}
