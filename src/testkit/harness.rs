//! A wired exchange for tests.

use std::sync::Arc;

use super::domain::market_params;
use super::notifier::RecordingNotifier;
use crate::adapter::outbound::clock::ManualClock;
use crate::adapter::outbound::ledger::InMemoryLedger;
use crate::application::{Exchange, ExchangePolicy};
use crate::domain::{AccountId, Amount, Bps, MarketId, PoolId, Side};
use crate::port::Clock;

/// Exchange plus handles on its clock, ledger and event stream.
pub struct Harness {
    pub exchange: Arc<Exchange>,
    pub clock: Arc<ManualClock>,
    pub ledger: Arc<InMemoryLedger>,
    pub events: RecordingNotifier,
}

impl Harness {
    /// Fresh exchange at time 0 with the default policy.
    pub fn new() -> Self {
        Self::with_policy(ExchangePolicy::default())
    }

    pub fn with_policy(policy: ExchangePolicy) -> Self {
        let clock = Arc::new(ManualClock::new(0));
        let ledger = Arc::new(InMemoryLedger::new());
        let events = RecordingNotifier::new();
        let exchange = Exchange::new(clock.clone(), ledger.clone())
            .with_policy(policy)
            .with_notifier(Box::new(events.clone()));
        Self {
            exchange: Arc::new(exchange),
            clock,
            ledger,
            events,
        }
    }

    /// Credit `amount` to `name` and return its account id.
    ///
    /// # Panics
    ///
    /// If the account would overflow.
    pub fn fund(&self, name: &str, amount: Amount) -> AccountId {
        let account = AccountId::new(name);
        self.ledger.mint(&account, amount).expect("fund account");
        account
    }

    /// Open a fee-free market resolving at `resolution_time_ms`.
    ///
    /// # Panics
    ///
    /// If the exchange rejects the market.
    pub fn open_market(&self, creator: &AccountId, resolution_time_ms: u64) -> MarketId {
        self.exchange
            .create_market(creator, market_params(resolution_time_ms))
            .expect("create market")
    }

    /// Fund `provider` with `seed` and open a pool on `market_id`.
    ///
    /// # Panics
    ///
    /// If the exchange rejects the pool.
    pub fn open_pool(&self, provider: &AccountId, market_id: MarketId, seed: Amount, fee_rate_bps: Bps) -> PoolId {
        self.ledger.mint(provider, seed).expect("fund provider");
        self.exchange
            .create_pool(provider, market_id, seed, fee_rate_bps)
            .expect("create pool")
    }

    /// Close and resolve `market_id` at its resolution time.
    ///
    /// # Panics
    ///
    /// If either transition is rejected.
    pub fn settle(&self, creator: &AccountId, market_id: MarketId, outcome: Side) {
        self.exchange
            .close_market(creator, market_id)
            .expect("close market");
        let market = self.exchange.market(market_id).expect("market");
        if self.clock.now_ms() < market.resolution_time_ms() {
            self.clock.set(market.resolution_time_ms());
        }
        self.exchange
            .resolve_market(creator, market_id, outcome)
            .expect("resolve market");
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
