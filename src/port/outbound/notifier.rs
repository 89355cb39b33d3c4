//! Notifier port for engine events.
//!
//! This module defines the trait for observing market lifecycle transitions,
//! pool creation, bet placement and settlement. Delivery is fire-and-forget:
//! the engine never reads events back, and a notifier failing cannot roll
//! back the state change that produced the event.

use crate::domain::{AccountId, Amount, Bps, MarketId, MarketStatus, Odds, PoolId, PositionId, Side};

/// Events emitted by the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A market was opened.
    MarketCreated {
        market_id: MarketId,
        creator: AccountId,
        at_ms: u64,
    },
    /// A market changed lifecycle status (closed, resolved or disputed).
    MarketTransitioned(TransitionEvent),
    /// A pool was seeded for a market.
    PoolCreated {
        pool_id: PoolId,
        market_id: MarketId,
        seed: Amount,
        fee_rate_bps: Bps,
    },
    /// A bet was filled and a position minted.
    BetPlaced(BetEvent),
    /// A position was redeemed and destroyed.
    PositionSettled(SettlementEvent),
    /// Surplus custody was withdrawn after resolution.
    SurplusSwept {
        pool_id: PoolId,
        recipient: AccountId,
        amount: Amount,
    },
}

/// Market status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    pub market_id: MarketId,
    /// Status after the transition.
    pub status: MarketStatus,
    /// Recorded outcome, once resolved.
    pub result: Option<Side>,
    pub at_ms: u64,
}

/// Filled bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetEvent {
    pub pool_id: PoolId,
    pub market_id: MarketId,
    pub position_id: PositionId,
    pub owner: AccountId,
    pub side: Side,
    pub stake: Amount,
    pub odds_before: Odds,
    pub odds_after: Odds,
    pub potential_payout: Amount,
    pub at_ms: u64,
}

/// Redeemed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementEvent {
    pub pool_id: PoolId,
    pub position_id: PositionId,
    pub owner: AccountId,
    pub win: bool,
    pub payout: Amount,
}

/// Trait for event handlers.
///
/// Implementations must be thread-safe and return quickly; the exchange
/// calls them after releasing its locks.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier for when events are not observed.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::info;
        match event {
            Event::MarketCreated {
                market_id,
                creator,
                at_ms,
            } => {
                info!(market_id = %market_id, creator = %creator, at_ms, "Market created");
            }
            Event::MarketTransitioned(e) => {
                info!(
                    market_id = %e.market_id,
                    status = %e.status,
                    result = ?e.result,
                    at_ms = e.at_ms,
                    "Market transitioned"
                );
            }
            Event::PoolCreated {
                pool_id,
                market_id,
                seed,
                fee_rate_bps,
            } => {
                info!(
                    pool_id = %pool_id,
                    market_id = %market_id,
                    seed,
                    fee_rate_bps,
                    "Pool created"
                );
            }
            Event::BetPlaced(e) => {
                info!(
                    pool_id = %e.pool_id,
                    position_id = %e.position_id,
                    owner = %e.owner,
                    side = %e.side,
                    stake = e.stake,
                    odds_before = e.odds_before.of(e.side),
                    odds_after = e.odds_after.of(e.side),
                    potential_payout = e.potential_payout,
                    "Bet placed"
                );
            }
            Event::PositionSettled(e) => {
                info!(
                    pool_id = %e.pool_id,
                    position_id = %e.position_id,
                    owner = %e.owner,
                    win = e.win,
                    payout = e.payout,
                    "Position settled"
                );
            }
            Event::SurplusSwept {
                pool_id,
                recipient,
                amount,
            } => {
                info!(pool_id = %pool_id, recipient = %recipient, amount, "Surplus swept");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingNotifier(Arc<AtomicUsize>);

    impl Notifier for CountingNotifier {
        fn notify(&self, _event: Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn created() -> Event {
        Event::MarketCreated {
            market_id: MarketId::new(1),
            creator: AccountId::new("alice"),
            at_ms: 0,
        }
    }

    #[test]
    fn registry_broadcasts_to_all() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(CountingNotifier(count.clone())));
        registry.register(Box::new(CountingNotifier(count.clone())));
        registry.register(Box::new(NullNotifier));

        registry.notify_all(created());

        assert_eq!(registry.len(), 3);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_registry_is_empty() {
        let registry = NotifierRegistry::default();
        assert!(registry.is_empty());
        registry.notify_all(created());
    }

    #[test]
    fn log_notifier_accepts_every_event() {
        let notifier = LogNotifier;
        notifier.notify(created());
        notifier.notify(Event::MarketTransitioned(TransitionEvent {
            market_id: MarketId::new(1),
            status: MarketStatus::Resolved,
            result: Some(Side::Yes),
            at_ms: 5,
        }));
        notifier.notify(Event::SurplusSwept {
            pool_id: PoolId::new(1),
            recipient: AccountId::new("alice"),
            amount: 10,
        });
    }
}
