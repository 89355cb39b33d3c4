//! Market lifecycle state machine.
//!
//! - [`Market`] - A binary market with resolution metadata and bet bounds
//! - [`MarketStatus`] - `Open -> Closed -> Resolved -> Disputed`, never backward
//! - [`MarketParams`] - Creation parameters supplied by the caller
//!
//! Only the creator may close or resolve a market. The pool bound to the
//! market records traded volume through [`Market::record_volume`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ExchangeError;
use super::id::{AccountId, MarketId};
use super::money::{Amount, Bps};
use super::outcome::Side;

/// Lifecycle status of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    /// Accepting bets.
    Open,
    /// No more bets; awaiting resolution.
    Closed,
    /// Outcome recorded; positions redeemable.
    Resolved,
    /// Resolution contested. Terminal.
    Disputed,
}

impl MarketStatus {
    /// Stable lowercase name used in logs and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Resolved => "resolved",
            Self::Disputed => "disputed",
        }
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for creating a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    /// Free-text question.
    pub description: String,
    /// Free-text category.
    pub category: String,
    /// Where the outcome will be read from.
    pub resolution_source: String,
    /// Earliest time the market may be resolved.
    pub resolution_time_ms: u64,
    /// Smallest accepted stake.
    pub min_bet: Amount,
    /// Largest accepted stake.
    pub max_bet: Amount,
    /// Treasury fee taken from every stake.
    pub fee_rate_bps: Bps,
}

/// A binary prediction market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Market {
    id: MarketId,
    creator: AccountId,
    description: String,
    category: String,
    resolution_source: String,
    resolution_time_ms: u64,
    status: MarketStatus,
    result: Option<Side>,
    total_volume: Amount,
    min_bet: Amount,
    max_bet: Amount,
    fee_rate_bps: Bps,
    created_at_ms: u64,
    closed_at_ms: Option<u64>,
    resolved_at_ms: Option<u64>,
}

impl Market {
    /// Create an open market with no result and zero volume.
    ///
    /// Parameter validation happens in the exchange before this is called.
    #[must_use]
    pub fn new(id: MarketId, creator: AccountId, params: MarketParams, now_ms: u64) -> Self {
        Self {
            id,
            creator,
            description: params.description,
            category: params.category,
            resolution_source: params.resolution_source,
            resolution_time_ms: params.resolution_time_ms,
            status: MarketStatus::Open,
            result: None,
            total_volume: 0,
            min_bet: params.min_bet,
            max_bet: params.max_bet,
            fee_rate_bps: params.fee_rate_bps,
            created_at_ms: now_ms,
            closed_at_ms: None,
            resolved_at_ms: None,
        }
    }

    /// Close the market to new bets.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the creator, `AlreadyClosed` unless open.
    pub fn close(&mut self, caller: &AccountId, now_ms: u64) -> Result<(), ExchangeError> {
        self.ensure_creator(caller)?;
        if self.status != MarketStatus::Open {
            return Err(ExchangeError::AlreadyClosed {
                status: self.status,
            });
        }
        self.status = MarketStatus::Closed;
        self.closed_at_ms = Some(now_ms);
        Ok(())
    }

    /// Record the outcome.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the creator, `NotClosed` unless
    /// closed, `BeforeResolutionTime` while `now_ms` is before the deadline.
    pub fn resolve(
        &mut self,
        caller: &AccountId,
        outcome: Side,
        now_ms: u64,
    ) -> Result<(), ExchangeError> {
        self.ensure_creator(caller)?;
        if self.status != MarketStatus::Closed {
            return Err(ExchangeError::NotClosed {
                status: self.status,
            });
        }
        if now_ms < self.resolution_time_ms {
            return Err(ExchangeError::BeforeResolutionTime {
                resolution_time_ms: self.resolution_time_ms,
                now_ms,
            });
        }
        self.status = MarketStatus::Resolved;
        self.result = Some(outcome);
        self.resolved_at_ms = Some(now_ms);
        Ok(())
    }

    /// Flag a resolved market as disputed. The recorded result is kept.
    pub fn dispute(&mut self) -> Result<(), ExchangeError> {
        if self.status != MarketStatus::Resolved {
            return Err(ExchangeError::NotResolved {
                status: self.status,
            });
        }
        self.status = MarketStatus::Disputed;
        Ok(())
    }

    /// Add a stake to the traded volume. Called by the bound pool only.
    pub(crate) fn record_volume(&mut self, amount: Amount) -> Result<(), ExchangeError> {
        self.total_volume = self.volume_after(amount)?;
        Ok(())
    }

    /// Volume after adding `amount`, without mutating.
    pub(crate) fn volume_after(&self, amount: Amount) -> Result<Amount, ExchangeError> {
        self.total_volume
            .checked_add(amount)
            .ok_or(ExchangeError::ArithmeticOverflow)
    }

    /// Require the market to be accepting bets.
    pub fn ensure_open(&self) -> Result<(), ExchangeError> {
        if self.status != MarketStatus::Open {
            return Err(ExchangeError::MarketNotOpen {
                status: self.status,
            });
        }
        Ok(())
    }

    /// Require a stake within `[min_bet, max_bet]`.
    pub fn ensure_bet_size(&self, amount: Amount) -> Result<(), ExchangeError> {
        if amount < self.min_bet || amount > self.max_bet {
            return Err(ExchangeError::InvalidBetAmount {
                amount,
                min: self.min_bet,
                max: self.max_bet,
            });
        }
        Ok(())
    }

    /// The recorded result, while the market is resolved.
    ///
    /// A disputed market keeps its result but stops paying out.
    ///
    /// # Errors
    ///
    /// `MarketNotResolved` unless the status is exactly `Resolved`.
    pub fn settled_result(&self) -> Result<Side, ExchangeError> {
        match (self.status, self.result) {
            (MarketStatus::Resolved, Some(side)) => Ok(side),
            _ => Err(ExchangeError::MarketNotResolved {
                status: self.status,
            }),
        }
    }

    fn ensure_creator(&self, caller: &AccountId) -> Result<(), ExchangeError> {
        if caller != &self.creator {
            return Err(ExchangeError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn id(&self) -> MarketId {
        self.id
    }

    #[must_use]
    pub const fn creator(&self) -> &AccountId {
        &self.creator
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn resolution_source(&self) -> &str {
        &self.resolution_source
    }

    #[must_use]
    pub const fn resolution_time_ms(&self) -> u64 {
        self.resolution_time_ms
    }

    #[must_use]
    pub const fn status(&self) -> MarketStatus {
        self.status
    }

    #[must_use]
    pub const fn result(&self) -> Option<Side> {
        self.result
    }

    #[must_use]
    pub const fn total_volume(&self) -> Amount {
        self.total_volume
    }

    #[must_use]
    pub const fn min_bet(&self) -> Amount {
        self.min_bet
    }

    #[must_use]
    pub const fn max_bet(&self) -> Amount {
        self.max_bet
    }

    /// Treasury fee rate in basis points.
    #[must_use]
    pub const fn fee_rate_bps(&self) -> Bps {
        self.fee_rate_bps
    }

    #[must_use]
    pub const fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    #[must_use]
    pub const fn closed_at_ms(&self) -> Option<u64> {
        self.closed_at_ms
    }

    #[must_use]
    pub const fn resolved_at_ms(&self) -> Option<u64> {
        self.resolved_at_ms
    }
}
