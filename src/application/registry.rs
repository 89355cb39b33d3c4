//! Id-keyed registry of market books.
//!
//! Each market and its pool live together in one [`MarketBook`] behind one
//! `RwLock`, so an operation touching both (a bet reading market status and
//! moving reserves, a redemption reading the result and releasing custody)
//! holds a single lock for its whole duration. Different markets never
//! contend with each other.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::domain::{ExchangeError, ExchangeId, Market, MarketId, Pool, PoolId, PositionId};

static NEXT_EXCHANGE: AtomicU64 = AtomicU64::new(1);

/// A market together with the pool bound to it.
#[derive(Debug)]
pub struct MarketBook {
    pub market: Market,
    pub pool: Option<Pool>,
}

impl MarketBook {
    /// Borrow market and pool mutably at once.
    ///
    /// # Errors
    ///
    /// `PoolNotFound` if no pool is bound yet.
    pub fn split_mut(&mut self, pool_id: PoolId) -> Result<(&mut Market, &mut Pool), ExchangeError> {
        match self.pool.as_mut() {
            Some(pool) if pool.id() == pool_id => Ok((&mut self.market, pool)),
            _ => Err(ExchangeError::PoolNotFound(pool_id)),
        }
    }

    /// Borrow the pool.
    ///
    /// # Errors
    ///
    /// `PoolNotFound` if no pool with this id is bound.
    pub fn pool(&self, pool_id: PoolId) -> Result<&Pool, ExchangeError> {
        match self.pool.as_ref() {
            Some(pool) if pool.id() == pool_id => Ok(pool),
            _ => Err(ExchangeError::PoolNotFound(pool_id)),
        }
    }
}

/// Shared handle to a locked book.
pub type SharedBook = Arc<RwLock<MarketBook>>;

/// Registry of all books plus id allocation.
///
/// DashMap guards are released before a book lock is taken, so the map is
/// never held while waiting on a book.
#[derive(Debug)]
pub struct Registry {
    exchange_id: ExchangeId,
    books: DashMap<MarketId, SharedBook>,
    pool_index: DashMap<PoolId, MarketId>,
    next_market: AtomicU64,
    next_pool: AtomicU64,
    next_position: AtomicU64,
}

impl Registry {
    /// Create an empty registry. Ids start at 1; the exchange id is unique
    /// within the process.
    #[must_use]
    pub fn new() -> Self {
        Self {
            exchange_id: ExchangeId::new(NEXT_EXCHANGE.fetch_add(1, Ordering::Relaxed)),
            books: DashMap::new(),
            pool_index: DashMap::new(),
            next_market: AtomicU64::new(1),
            next_pool: AtomicU64::new(1),
            next_position: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub const fn exchange_id(&self) -> ExchangeId {
        self.exchange_id
    }

    pub fn next_market_id(&self) -> MarketId {
        MarketId::new(self.next_market.fetch_add(1, Ordering::SeqCst))
    }

    pub fn next_pool_id(&self) -> PoolId {
        PoolId::new(self.next_pool.fetch_add(1, Ordering::SeqCst))
    }

    pub fn next_position_id(&self) -> PositionId {
        PositionId::new(self.next_position.fetch_add(1, Ordering::SeqCst))
    }

    /// Register a new market with no pool.
    pub fn insert_market(&self, market: Market) {
        let id = market.id();
        let book = MarketBook { market, pool: None };
        self.books.insert(id, Arc::new(RwLock::new(book)));
    }

    /// Record which market a pool belongs to.
    pub fn index_pool(&self, pool_id: PoolId, market_id: MarketId) {
        self.pool_index.insert(pool_id, market_id);
    }

    /// Look up a market's book.
    ///
    /// # Errors
    ///
    /// `MarketNotFound` for an unknown id.
    pub fn book(&self, market_id: MarketId) -> Result<SharedBook, ExchangeError> {
        self.books
            .get(&market_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(ExchangeError::MarketNotFound(market_id))
    }

    /// Look up the book holding a pool.
    ///
    /// # Errors
    ///
    /// `PoolNotFound` for an unknown id.
    pub fn book_for_pool(&self, pool_id: PoolId) -> Result<SharedBook, ExchangeError> {
        let market_id = self
            .pool_index
            .get(&pool_id)
            .map(|entry| *entry.value())
            .ok_or(ExchangeError::PoolNotFound(pool_id))?;
        self.book(market_id)
    }

    /// All registered market ids, ascending.
    #[must_use]
    pub fn market_ids(&self) -> Vec<MarketId> {
        let mut ids: Vec<MarketId> = self.books.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered markets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// True when no market is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, MarketParams};

    fn make_market(id: MarketId) -> Market {
        Market::new(
            id,
            AccountId::new("creator"),
            MarketParams {
                description: "Test?".into(),
                category: "test".into(),
                resolution_source: "test".into(),
                resolution_time_ms: 0,
                min_bet: 1,
                max_bet: 10,
                fee_rate_bps: 0,
            },
            0,
        )
    }

    #[test]
    fn ids_are_monotonic_and_start_at_one() {
        let registry = Registry::new();
        assert_eq!(registry.next_market_id().value(), 1);
        assert_eq!(registry.next_market_id().value(), 2);
        assert_eq!(registry.next_pool_id().value(), 1);
        assert_eq!(registry.next_position_id().value(), 1);
    }

    #[test]
    fn each_registry_gets_its_own_exchange_id() {
        let first = Registry::new();
        let second = Registry::new();
        assert_ne!(first.exchange_id(), second.exchange_id());
    }

    #[test]
    fn unknown_market_is_not_found() {
        let registry = Registry::new();
        assert!(matches!(
            registry.book(MarketId::new(9)),
            Err(ExchangeError::MarketNotFound(_))
        ));
    }

    #[test]
    fn unknown_pool_is_not_found() {
        let registry = Registry::new();
        assert!(matches!(
            registry.book_for_pool(PoolId::new(9)),
            Err(ExchangeError::PoolNotFound(_))
        ));
    }

    #[test]
    fn market_ids_are_sorted() {
        let registry = Registry::new();
        for _ in 0..3 {
            let id = registry.next_market_id();
            registry.insert_market(make_market(id));
        }
        assert_eq!(
            registry.market_ids(),
            vec![MarketId::new(1), MarketId::new(2), MarketId::new(3)]
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn book_without_pool_reports_pool_not_found() {
        let registry = Registry::new();
        let id = registry.next_market_id();
        registry.insert_market(make_market(id));
        let book = registry.book(id).unwrap();
        let mut guard = book.write();
        assert!(matches!(
            guard.split_mut(PoolId::new(1)),
            Err(ExchangeError::PoolNotFound(_))
        ));
    }
}
