//! Prediction market exchange service.
//!
//! [`Exchange`] is the engine's top-level context: it owns the registry of
//! markets and pools, allocates ids, and runs every operation as one
//! all-or-nothing transition under the market book's lock. Collaborators
//! (clock, custody ledger, notifiers) are injected through ports.
//!
//! Every mutating operation follows the same shape: take the book's write
//! lock, run all checks against the current state, move funds through the
//! ledger, commit, release the lock, then emit events.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::registry::{MarketBook, Registry};
use crate::domain::position::MintRequest;
use crate::domain::{
    AccountId, Amount, Bps, ExchangeError, Market, MarketId, MarketParams, MarketStatus, Odds,
    Pool, PoolId, PoolSnapshot, Position, PositionId, Side, BPS_DENOMINATOR,
};
use crate::port::{
    BetEvent, Clock, Event, Ledger, Notifier, NotifierRegistry, SettlementEvent, TransitionEvent,
};

/// Limits applied when markets and pools are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangePolicy {
    /// Highest treasury or pool fee rate accepted, in basis points.
    pub max_fee_bps: Bps,
}

impl Default for ExchangePolicy {
    fn default() -> Self {
        Self {
            max_fee_bps: BPS_DENOMINATOR,
        }
    }
}

/// Result of a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub position_id: PositionId,
    /// Account that received the payout.
    pub owner: AccountId,
    pub side: Side,
    pub win: bool,
    pub payout: Amount,
}

/// A redemption that did not go through.
///
/// Carries the position back to the caller untouched so it can be redeemed
/// later (for example once the market resolves).
#[derive(Debug, Error)]
#[error("redemption of {} rejected: {error}", position.id())]
pub struct RedeemRejected {
    pub position: Position,
    #[source]
    pub error: ExchangeError,
}

impl RedeemRejected {
    /// Split into the returned position and the reason.
    #[must_use]
    pub fn into_parts(self) -> (Position, ExchangeError) {
        (self.position, self.error)
    }
}

/// The pricing and settlement engine.
pub struct Exchange {
    registry: Registry,
    clock: Arc<dyn Clock>,
    ledger: Arc<dyn Ledger>,
    notifiers: NotifierRegistry,
    policy: ExchangePolicy,
}

impl Exchange {
    /// Create an exchange with the default policy and no notifiers.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            registry: Registry::new(),
            clock,
            ledger,
            notifiers: NotifierRegistry::new(),
            policy: ExchangePolicy::default(),
        }
    }

    /// Replace the creation policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ExchangePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register an event notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.register(notifier);
        self
    }

    /// The creation policy in force.
    #[must_use]
    pub const fn policy(&self) -> ExchangePolicy {
        self.policy
    }

    /// Open a new market owned by `caller`.
    ///
    /// # Errors
    ///
    /// `InvalidBetBounds` when `min_bet` is zero or above `max_bet`,
    /// `InvalidFeeRate` when the treasury fee exceeds the policy ceiling.
    pub fn create_market(
        &self,
        caller: &AccountId,
        params: MarketParams,
    ) -> Result<MarketId, ExchangeError> {
        self.check_market_params(&params)
            .map_err(|e| reject("create_market", e))?;

        let now_ms = self.clock.now_ms();
        let market_id = self.registry.next_market_id();
        info!(
            market_id = %market_id,
            creator = %caller,
            resolution_time_ms = params.resolution_time_ms,
            min_bet = params.min_bet,
            max_bet = params.max_bet,
            fee_rate_bps = params.fee_rate_bps,
            "Market created"
        );
        self.registry
            .insert_market(Market::new(market_id, caller.clone(), params, now_ms));

        self.notifiers.notify_all(Event::MarketCreated {
            market_id,
            creator: caller.clone(),
            at_ms: now_ms,
        });
        Ok(market_id)
    }

    /// Close a market to new bets. Creator only.
    ///
    /// # Errors
    ///
    /// `MarketNotFound`, `Unauthorized`, `AlreadyClosed`.
    pub fn close_market(&self, caller: &AccountId, market_id: MarketId) -> Result<(), ExchangeError> {
        let book = self.registry.book(market_id)?;
        let now_ms = self.clock.now_ms();
        book.write()
            .market
            .close(caller, now_ms)
            .map_err(|e| reject("close_market", e))?;

        info!(market_id = %market_id, "Market closed");
        self.emit_transition(market_id, MarketStatus::Closed, None, now_ms);
        Ok(())
    }

    /// Record a market's outcome. Creator only, after the deadline.
    ///
    /// # Errors
    ///
    /// `MarketNotFound`, `Unauthorized`, `NotClosed`, `BeforeResolutionTime`.
    pub fn resolve_market(
        &self,
        caller: &AccountId,
        market_id: MarketId,
        outcome: Side,
    ) -> Result<(), ExchangeError> {
        let book = self.registry.book(market_id)?;
        let now_ms = self.clock.now_ms();
        book.write()
            .market
            .resolve(caller, outcome, now_ms)
            .map_err(|e| reject("resolve_market", e))?;

        info!(market_id = %market_id, outcome = %outcome, "Market resolved");
        self.emit_transition(market_id, MarketStatus::Resolved, Some(outcome), now_ms);
        Ok(())
    }

    /// Flag a resolved market as disputed. Payouts stop; nothing else happens.
    ///
    /// # Errors
    ///
    /// `MarketNotFound`, `NotResolved`.
    pub fn dispute_market(&self, market_id: MarketId) -> Result<(), ExchangeError> {
        let book = self.registry.book(market_id)?;
        let now_ms = self.clock.now_ms();
        let result = {
            let mut guard = book.write();
            guard
                .market
                .dispute()
                .map_err(|e| reject("dispute_market", e))?;
            guard.market.result()
        };

        warn!(market_id = %market_id, "Market disputed");
        self.emit_transition(market_id, MarketStatus::Disputed, result, now_ms);
        Ok(())
    }

    /// Bind a pool to an open market, seeded from `caller`'s account.
    ///
    /// # Errors
    ///
    /// `MarketNotFound`, `PoolAlreadyExists`, `MarketNotOpen`,
    /// `InsufficientSeed`, `InvalidFeeRate`, `InsufficientFunds`.
    pub fn create_pool(
        &self,
        caller: &AccountId,
        market_id: MarketId,
        seed_amount: Amount,
        fee_rate_bps: Bps,
    ) -> Result<PoolId, ExchangeError> {
        let book = self.registry.book(market_id)?;
        let pool_id = {
            let mut guard = book.write();
            self.open_pool(&mut guard, caller, seed_amount, fee_rate_bps)
                .map_err(|e| reject("create_pool", e))?
        };

        info!(
            pool_id = %pool_id,
            market_id = %market_id,
            provider = %caller,
            seed = seed_amount,
            fee_rate_bps,
            "Pool created"
        );
        self.notifiers.notify_all(Event::PoolCreated {
            pool_id,
            market_id,
            seed: seed_amount,
            fee_rate_bps,
        });
        Ok(pool_id)
    }

    /// Current implied odds of a pool. Read-only.
    ///
    /// # Errors
    ///
    /// `PoolNotFound`.
    pub fn quote_odds(&self, pool_id: PoolId) -> Result<Odds, ExchangeError> {
        let book = self.registry.book_for_pool(pool_id)?;
        let odds = book.read().pool(pool_id)?.odds();
        debug!(pool_id = %pool_id, yes = odds.yes(), no = odds.no(), "Quoted odds");
        Ok(odds)
    }

    /// Place a bet and mint the resulting position to `caller`.
    ///
    /// `max_slippage_bps` bounds how far the bet side's odds may drift from
    /// the pre-trade quote; pass [`BPS_DENOMINATOR`] for no limit.
    ///
    /// # Errors
    ///
    /// `PoolNotFound`, `MarketNotOpen`, `InvalidBetAmount`, `SlippageExceeded`,
    /// `PoolExhausted`, `Insolvent`, `InsufficientFunds`. On any error the
    /// pool, market and caller's account are unchanged.
    pub fn place_bet(
        &self,
        caller: &AccountId,
        pool_id: PoolId,
        side: Side,
        stake: Amount,
        max_slippage_bps: Bps,
    ) -> Result<Position, ExchangeError> {
        let book = self.registry.book_for_pool(pool_id)?;
        let now_ms = self.clock.now_ms();

        let (position, event) = {
            let mut guard = book.write();
            let (market, pool) = guard.split_mut(pool_id)?;

            let fill = pool
                .plan_bet(market, side, stake, max_slippage_bps)
                .map_err(|e| reject("place_bet", e))?;
            let funds = self
                .ledger
                .withdraw(caller, stake)
                .map_err(|e| reject("place_bet", e))?;

            let position_id = self.registry.next_position_id();
            pool.apply_bet(&fill, position_id, funds)?;
            market.record_volume(stake)?;

            let position = Position::mint(MintRequest {
                id: position_id,
                exchange_id: self.registry.exchange_id(),
                market_id: market.id(),
                pool_id,
                owner: caller.clone(),
                side,
                amount: stake,
                odds_at_purchase: fill.quoted_odds(),
                potential_payout: fill.potential_payout,
                purchase_time_ms: now_ms,
            });
            let event = BetEvent {
                pool_id,
                market_id: market.id(),
                position_id,
                owner: caller.clone(),
                side,
                stake,
                odds_before: fill.odds_before,
                odds_after: fill.odds_after,
                potential_payout: fill.potential_payout,
                at_ms: now_ms,
            };
            debug!(
                pool_id = %pool_id,
                yes_reserve = pool.yes_reserve(),
                no_reserve = pool.no_reserve(),
                custody = pool.custodied_balance(),
                "Reserves after bet"
            );
            (position, event)
        };

        info!(
            pool_id = %pool_id,
            position_id = %position.id(),
            side = %side,
            stake,
            odds = position.odds_at_purchase(),
            potential_payout = position.potential_payout(),
            "Bet placed"
        );
        self.notifiers.notify_all(Event::BetPlaced(event));
        Ok(position)
    }

    /// Redeem a position against its pool, paying its owner if it won.
    ///
    /// The position is destroyed whether it wins or loses. If the redemption
    /// is rejected the position comes back inside [`RedeemRejected`].
    ///
    /// # Errors
    ///
    /// `PoolNotFound`, `MarketNotResolved`, `UnknownPosition` (including a
    /// position minted by another exchange), `InsufficientCustody`,
    /// `AccountOverflow` when the owner's account cannot take the payout.
    pub fn redeem(&self, position: Position) -> Result<Settlement, RedeemRejected> {
        let pool_id = position.pool_id();
        if position.exchange_id() != self.registry.exchange_id() {
            let error = ExchangeError::UnknownPosition(position.id());
            return Err(RedeemRejected {
                position,
                error: reject("redeem", error),
            });
        }
        let book = match self.registry.book_for_pool(pool_id) {
            Ok(book) => book,
            Err(error) => return Err(RedeemRejected { position, error }),
        };

        let settlement = {
            let mut guard = book.write();
            let (market, pool) = match guard.split_mut(pool_id) {
                Ok(parts) => parts,
                Err(error) => return Err(RedeemRejected { position, error }),
            };
            let redemption = match pool.plan_redeem(market, &position) {
                Ok(redemption) => redemption,
                Err(error) => {
                    return Err(RedeemRejected {
                        position,
                        error: reject("redeem", error),
                    })
                }
            };
            let payout = match pool.take_payout(&redemption) {
                Ok(payout) => payout,
                Err(error) => return Err(RedeemRejected { position, error }),
            };
            if let Err(rejected) = self.ledger.deposit(position.owner(), payout) {
                let (funds, error) = rejected.into_parts();
                if let Err(error) = pool.restore_custody(funds) {
                    return Err(RedeemRejected { position, error });
                }
                return Err(RedeemRejected {
                    position,
                    error: reject("redeem", error),
                });
            }
            if let Err(error) = pool.settle_redeem(position.id()) {
                return Err(RedeemRejected { position, error });
            }

            Settlement {
                position_id: position.id(),
                owner: position.owner().clone(),
                side: position.side(),
                win: redemption.win,
                payout: redemption.payout,
            }
        };
        drop(position);

        info!(
            pool_id = %pool_id,
            position_id = %settlement.position_id,
            owner = %settlement.owner,
            win = settlement.win,
            payout = settlement.payout,
            "Position redeemed"
        );
        self.notifiers
            .notify_all(Event::PositionSettled(SettlementEvent {
                pool_id,
                position_id: settlement.position_id,
                owner: settlement.owner.clone(),
                win: settlement.win,
                payout: settlement.payout,
            }));
        Ok(settlement)
    }

    /// Withdraw custody beyond what outstanding winning positions can claim.
    ///
    /// Only the pool's liquidity provider may sweep, and only once the market
    /// is resolved. Returns the amount credited to the provider.
    ///
    /// # Errors
    ///
    /// `PoolNotFound`, `MarketNotResolved`, `Unauthorized`, `AccountOverflow`.
    pub fn sweep_surplus(&self, caller: &AccountId, pool_id: PoolId) -> Result<Amount, ExchangeError> {
        let book = self.registry.book_for_pool(pool_id)?;
        let amount = {
            let mut guard = book.write();
            let (market, pool) = guard.split_mut(pool_id)?;
            let amount = pool.surplus(market).map_err(|e| reject("sweep_surplus", e))?;
            if caller != pool.provider() {
                return Err(reject(
                    "sweep_surplus",
                    ExchangeError::Unauthorized {
                        caller: caller.clone(),
                    },
                ));
            }
            let funds = pool.withdraw_surplus(amount)?;
            if let Err(rejected) = self.ledger.deposit(caller, funds) {
                let (funds, error) = rejected.into_parts();
                pool.restore_custody(funds)?;
                return Err(reject("sweep_surplus", error));
            }
            amount
        };

        info!(pool_id = %pool_id, recipient = %caller, amount, "Surplus swept");
        self.notifiers.notify_all(Event::SurplusSwept {
            pool_id,
            recipient: caller.clone(),
            amount,
        });
        Ok(amount)
    }

    /// Snapshot of a market.
    ///
    /// # Errors
    ///
    /// `MarketNotFound`.
    pub fn market(&self, market_id: MarketId) -> Result<Market, ExchangeError> {
        let book = self.registry.book(market_id)?;
        let market = book.read().market.clone();
        Ok(market)
    }

    /// Snapshot of a pool.
    ///
    /// # Errors
    ///
    /// `PoolNotFound`.
    pub fn pool(&self, pool_id: PoolId) -> Result<PoolSnapshot, ExchangeError> {
        let book = self.registry.book_for_pool(pool_id)?;
        let snapshot = book.read().pool(pool_id)?.snapshot();
        Ok(snapshot)
    }

    /// The pool bound to a market, if any.
    #[must_use]
    pub fn pool_for_market(&self, market_id: MarketId) -> Option<PoolId> {
        let book = self.registry.book(market_id).ok()?;
        let pool_id = book.read().pool.as_ref().map(Pool::id);
        pool_id
    }

    /// All market ids, ascending.
    #[must_use]
    pub fn market_ids(&self) -> Vec<MarketId> {
        self.registry.market_ids()
    }

    fn check_market_params(&self, params: &MarketParams) -> Result<(), ExchangeError> {
        if params.min_bet == 0 || params.min_bet > params.max_bet {
            return Err(ExchangeError::InvalidBetBounds {
                min: params.min_bet,
                max: params.max_bet,
            });
        }
        if params.fee_rate_bps > self.policy.max_fee_bps {
            return Err(ExchangeError::InvalidFeeRate {
                fee_rate_bps: params.fee_rate_bps,
                max: self.policy.max_fee_bps,
            });
        }
        Ok(())
    }

    fn open_pool(
        &self,
        book: &mut MarketBook,
        caller: &AccountId,
        seed_amount: Amount,
        fee_rate_bps: Bps,
    ) -> Result<PoolId, ExchangeError> {
        if let Some(existing) = &book.pool {
            return Err(ExchangeError::PoolAlreadyExists {
                market_id: book.market.id(),
                pool_id: existing.id(),
            });
        }
        Pool::check_creation(&book.market, seed_amount, fee_rate_bps, self.policy.max_fee_bps)?;
        let seed = self.ledger.withdraw(caller, seed_amount)?;

        let pool_id = self.registry.next_pool_id();
        let market_id = book.market.id();
        book.pool = Some(Pool::new(
            pool_id,
            market_id,
            caller.clone(),
            seed,
            fee_rate_bps,
        ));
        self.registry.index_pool(pool_id, market_id);
        Ok(pool_id)
    }

    fn emit_transition(
        &self,
        market_id: MarketId,
        status: MarketStatus,
        result: Option<Side>,
        at_ms: u64,
    ) {
        self.notifiers
            .notify_all(Event::MarketTransitioned(TransitionEvent {
                market_id,
                status,
                result,
                at_ms,
            }));
    }
}

/// Log a rejected operation and pass the error through.
fn reject(operation: &'static str, error: ExchangeError) -> ExchangeError {
    warn!(operation, code = error.code(), error = %error, "Operation rejected");
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::clock::ManualClock;
    use crate::adapter::outbound::ledger::InMemoryLedger;

    struct Fixture {
        exchange: Exchange,
        clock: Arc<ManualClock>,
        ledger: Arc<InMemoryLedger>,
        creator: AccountId,
        bettor: AccountId,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(0));
        let ledger = Arc::new(InMemoryLedger::new());
        let creator = AccountId::new("creator");
        let bettor = AccountId::new("bettor");
        ledger.mint(&creator, 10_000_000).unwrap();
        ledger.mint(&bettor, 10_000_000).unwrap();
        let exchange = Exchange::new(clock.clone(), ledger.clone());
        Fixture {
            exchange,
            clock,
            ledger,
            creator,
            bettor,
        }
    }

    fn params(resolution_time_ms: u64) -> MarketParams {
        MarketParams {
            description: "Will it rain tomorrow?".into(),
            category: "weather".into(),
            resolution_source: "met office".into(),
            resolution_time_ms,
            min_bet: 100,
            max_bet: 200_000,
            fee_rate_bps: 0,
        }
    }

    fn open_pool(f: &Fixture) -> (MarketId, PoolId) {
        let market_id = f.exchange.create_market(&f.creator, params(1_000)).unwrap();
        let pool_id = f
            .exchange
            .create_pool(&f.creator, market_id, 1_000_000, 0)
            .unwrap();
        (market_id, pool_id)
    }

    #[test]
    fn create_market_rejects_inverted_bounds() {
        let f = fixture();
        let mut p = params(0);
        p.min_bet = 500;
        p.max_bet = 100;
        assert_eq!(
            f.exchange.create_market(&f.creator, p),
            Err(ExchangeError::InvalidBetBounds { min: 500, max: 100 })
        );
        assert!(f.exchange.market_ids().is_empty());
    }

    #[test]
    fn create_market_rejects_fee_above_policy() {
        let f = fixture();
        let exchange = Exchange::new(f.clock.clone(), f.ledger.clone())
            .with_policy(ExchangePolicy { max_fee_bps: 500 });
        let mut p = params(0);
        p.fee_rate_bps = 501;
        assert!(matches!(
            exchange.create_market(&f.creator, p),
            Err(ExchangeError::InvalidFeeRate { fee_rate_bps: 501, max: 500 })
        ));
    }

    #[test]
    fn create_pool_moves_seed_into_custody() {
        let f = fixture();
        let (market_id, pool_id) = open_pool(&f);

        let snapshot = f.exchange.pool(pool_id).unwrap();
        assert_eq!(snapshot.custodied_balance, 1_000_000);
        assert_eq!(snapshot.market_id, market_id);
        assert_eq!(f.ledger.balance_of(&f.creator), 9_000_000);
        assert_eq!(f.exchange.pool_for_market(market_id), Some(pool_id));
    }

    #[test]
    fn second_pool_for_market_is_rejected() {
        let f = fixture();
        let (market_id, pool_id) = open_pool(&f);
        assert_eq!(
            f.exchange.create_pool(&f.creator, market_id, 1_000, 0),
            Err(ExchangeError::PoolAlreadyExists { market_id, pool_id })
        );
        assert_eq!(f.ledger.balance_of(&f.creator), 9_000_000);
    }

    #[test]
    fn unfunded_bet_leaves_pool_untouched() {
        let f = fixture();
        let (_, pool_id) = open_pool(&f);
        let broke = AccountId::new("broke");
        let before = f.exchange.pool(pool_id).unwrap();

        let err = f
            .exchange
            .place_bet(&broke, pool_id, Side::Yes, 1_000, BPS_DENOMINATOR)
            .unwrap_err();

        assert!(matches!(err, ExchangeError::InsufficientFunds { .. }));
        assert_eq!(f.exchange.pool(pool_id).unwrap(), before);
    }

    #[test]
    fn redeem_before_resolution_returns_position() {
        let f = fixture();
        let (_, pool_id) = open_pool(&f);
        let position = f
            .exchange
            .place_bet(&f.bettor, pool_id, Side::Yes, 1_000, BPS_DENOMINATOR)
            .unwrap();
        let id = position.id();

        let rejected = f.exchange.redeem(position).unwrap_err();
        let (position, error) = rejected.into_parts();

        assert_eq!(position.id(), id);
        assert!(matches!(error, ExchangeError::MarketNotResolved { .. }));
        assert_eq!(f.exchange.pool(pool_id).unwrap().outstanding_positions, 1);
    }

    #[test]
    fn winner_is_paid_into_owner_account() {
        let f = fixture();
        let (market_id, pool_id) = open_pool(&f);
        let position = f
            .exchange
            .place_bet(&f.bettor, pool_id, Side::No, 1_000, BPS_DENOMINATOR)
            .unwrap();
        let carol = AccountId::new("carol");
        let position = position.transfer_to(carol.clone());

        f.exchange.close_market(&f.creator, market_id).unwrap();
        f.clock.set(1_000);
        f.exchange
            .resolve_market(&f.creator, market_id, Side::No)
            .unwrap();
        let settlement = f.exchange.redeem(position).unwrap();

        assert!(settlement.win);
        assert_eq!(settlement.payout, 2_000);
        assert_eq!(settlement.owner, carol);
        assert_eq!(f.ledger.balance_of(&carol), 2_000);
    }

    #[test]
    fn payout_that_overflows_the_owner_account_is_rolled_back() {
        let f = fixture();
        let (market_id, pool_id) = open_pool(&f);
        let position = f
            .exchange
            .place_bet(&f.bettor, pool_id, Side::Yes, 1_000, BPS_DENOMINATOR)
            .unwrap();
        let topped_up = u64::MAX - f.ledger.balance_of(&f.bettor);
        f.ledger.mint(&f.bettor, topped_up).unwrap();

        f.exchange.close_market(&f.creator, market_id).unwrap();
        f.clock.set(1_000);
        f.exchange
            .resolve_market(&f.creator, market_id, Side::Yes)
            .unwrap();
        let before = f.exchange.pool(pool_id).unwrap();

        let (position, error) = f.exchange.redeem(position).unwrap_err().into_parts();

        assert!(matches!(error, ExchangeError::AccountOverflow { .. }));
        assert_eq!(f.exchange.pool(pool_id).unwrap(), before);
        assert_eq!(f.ledger.balance_of(&f.bettor), u64::MAX);

        // Once the account has room the same position pays out.
        f.ledger.withdraw(&f.bettor, 10_000).map(drop).unwrap();
        let settlement = f.exchange.redeem(position).unwrap();
        assert_eq!(settlement.payout, 2_000);
        assert_eq!(f.exchange.pool(pool_id).unwrap().outstanding_positions, 0);
    }

    #[test]
    fn position_from_another_exchange_is_refused() {
        let f = fixture();
        let other = fixture();
        let (market_id, pool_id) = open_pool(&f);
        let (other_market, other_pool) = open_pool(&other);
        assert_eq!(pool_id, other_pool);
        let own = f
            .exchange
            .place_bet(&f.bettor, pool_id, Side::Yes, 1_000, BPS_DENOMINATOR)
            .unwrap();
        let foreign = other
            .exchange
            .place_bet(&other.bettor, other_pool, Side::Yes, 1_000, BPS_DENOMINATOR)
            .unwrap();
        assert_eq!(own.id(), foreign.id());
        assert_eq!(own.terms(), foreign.terms());

        for (exchange, clock, creator, market) in [
            (&f.exchange, &f.clock, &f.creator, market_id),
            (&other.exchange, &other.clock, &other.creator, other_market),
        ] {
            exchange.close_market(creator, market).unwrap();
            clock.set(1_000);
            exchange.resolve_market(creator, market, Side::Yes).unwrap();
        }

        let (foreign, error) = f.exchange.redeem(foreign).unwrap_err().into_parts();
        assert_eq!(error, ExchangeError::UnknownPosition(foreign.id()));
        assert_eq!(f.exchange.pool(pool_id).unwrap().outstanding_positions, 1);

        assert_eq!(f.exchange.redeem(own).unwrap().payout, 2_000);
        assert_eq!(other.exchange.redeem(foreign).unwrap().payout, 2_000);
    }

    #[test]
    fn sweep_requires_provider_and_resolution() {
        let f = fixture();
        let (market_id, pool_id) = open_pool(&f);
        f.exchange
            .place_bet(&f.bettor, pool_id, Side::Yes, 100_000, BPS_DENOMINATOR)
            .map(drop)
            .unwrap();

        assert!(matches!(
            f.exchange.sweep_surplus(&f.creator, pool_id),
            Err(ExchangeError::MarketNotResolved { .. })
        ));

        f.exchange.close_market(&f.creator, market_id).unwrap();
        f.clock.set(1_000);
        f.exchange
            .resolve_market(&f.creator, market_id, Side::Yes)
            .unwrap();

        assert!(matches!(
            f.exchange.sweep_surplus(&f.bettor, pool_id),
            Err(ExchangeError::Unauthorized { .. })
        ));
        let swept = f.exchange.sweep_surplus(&f.creator, pool_id).unwrap();
        assert_eq!(swept, 900_000);
        let snapshot = f.exchange.pool(pool_id).unwrap();
        assert_eq!(snapshot.custodied_balance, 200_000);
        assert_eq!(snapshot.yes_liability, 200_000);
    }

    #[test]
    fn dispute_freezes_redemption() {
        let f = fixture();
        let (market_id, pool_id) = open_pool(&f);
        let position = f
            .exchange
            .place_bet(&f.bettor, pool_id, Side::Yes, 1_000, BPS_DENOMINATOR)
            .unwrap();
        f.exchange.close_market(&f.creator, market_id).unwrap();
        f.clock.set(1_000);
        f.exchange
            .resolve_market(&f.creator, market_id, Side::Yes)
            .unwrap();
        f.exchange.dispute_market(market_id).unwrap();

        let rejected = f.exchange.redeem(position).unwrap_err();
        assert!(matches!(
            rejected.error,
            ExchangeError::MarketNotResolved {
                status: MarketStatus::Disputed
            }
        ));
    }
}
