//! Redeemable bet positions.
//!
//! A [`Position`] is minted by a pool when a bet is placed and consumed by
//! exactly one redemption. It is deliberately not `Clone`: the holder owns
//! the only live value, moves it to transfer it, and gives it up to redeem.

use serde::Serialize;

use super::id::{AccountId, ExchangeId, MarketId, PoolId, PositionId, StrategyId};
use super::money::{Amount, Bps};
use super::outcome::Side;

/// The financial terms of a position, as read by external token wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionTerms {
    pub market_id: MarketId,
    pub side: Side,
    pub amount: Amount,
    pub odds_at_purchase: Bps,
    pub potential_payout: Amount,
}

/// A claim on a pool's custody, payable if `side` matches the market result.
///
/// Financial terms are fixed at mint. Only the owner and the auxiliary
/// token fields may change before redemption.
#[derive(Debug, PartialEq, Eq)]
pub struct Position {
    id: PositionId,
    exchange_id: ExchangeId,
    market_id: MarketId,
    pool_id: PoolId,
    owner: AccountId,
    side: Side,
    amount: Amount,
    odds_at_purchase: Bps,
    potential_payout: Amount,
    purchase_time_ms: u64,
    yield_enabled: bool,
    yield_strategy: Option<StrategyId>,
}

/// Terms for minting a new position.
#[derive(Debug)]
pub(crate) struct MintRequest {
    pub id: PositionId,
    pub exchange_id: ExchangeId,
    pub market_id: MarketId,
    pub pool_id: PoolId,
    pub owner: AccountId,
    pub side: Side,
    pub amount: Amount,
    pub odds_at_purchase: Bps,
    pub potential_payout: Amount,
    pub purchase_time_ms: u64,
}

impl Position {
    pub(crate) fn mint(request: MintRequest) -> Self {
        Self {
            id: request.id,
            exchange_id: request.exchange_id,
            market_id: request.market_id,
            pool_id: request.pool_id,
            owner: request.owner,
            side: request.side,
            amount: request.amount,
            odds_at_purchase: request.odds_at_purchase,
            potential_payout: request.potential_payout,
            purchase_time_ms: request.purchase_time_ms,
            yield_enabled: false,
            yield_strategy: None,
        }
    }

    /// Hand the position to a new owner. Payouts go to whoever owns it at redemption.
    #[must_use]
    pub fn transfer_to(mut self, owner: AccountId) -> Self {
        self.owner = owner;
        self
    }

    /// The tuple external marketplace and yield modules read.
    #[must_use]
    pub fn terms(&self) -> PositionTerms {
        PositionTerms {
            market_id: self.market_id,
            side: self.side,
            amount: self.amount,
            odds_at_purchase: self.odds_at_purchase,
            potential_payout: self.potential_payout,
        }
    }

    /// Payout this position earns if the market resolves to `result`.
    #[must_use]
    pub fn payout_for(&self, result: Side) -> Amount {
        if self.side == result {
            self.potential_payout
        } else {
            0
        }
    }

    #[must_use]
    pub const fn id(&self) -> PositionId {
        self.id
    }

    /// Exchange that minted the position and alone can redeem it.
    #[must_use]
    pub const fn exchange_id(&self) -> ExchangeId {
        self.exchange_id
    }

    #[must_use]
    pub const fn market_id(&self) -> MarketId {
        self.market_id
    }

    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    #[must_use]
    pub const fn owner(&self) -> &AccountId {
        &self.owner
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Gross stake, fees included.
    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    #[must_use]
    pub const fn odds_at_purchase(&self) -> Bps {
        self.odds_at_purchase
    }

    #[must_use]
    pub const fn potential_payout(&self) -> Amount {
        self.potential_payout
    }

    #[must_use]
    pub const fn purchase_time_ms(&self) -> u64 {
        self.purchase_time_ms
    }

    #[must_use]
    pub const fn yield_enabled(&self) -> bool {
        self.yield_enabled
    }

    pub fn set_yield_enabled(&mut self, enabled: bool) {
        self.yield_enabled = enabled;
    }

    #[must_use]
    pub const fn yield_strategy(&self) -> Option<&StrategyId> {
        self.yield_strategy.as_ref()
    }

    /// Attach (or with `None`, detach) an external yield strategy.
    pub fn set_yield_strategy(&mut self, strategy: Option<StrategyId>) {
        self.yield_strategy = strategy;
    }
}
