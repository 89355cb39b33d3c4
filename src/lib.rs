//! Oddsmaker - binary-outcome prediction markets priced by a constant-product pool.
//!
//! Each market asks a YES/NO question. A pool bound to the market holds two
//! reserves whose ratio sets the implied odds; bets swap against the pool,
//! mint a redeemable [`Position`](domain::Position) and move the price.
//! After the market's creator resolves it, winning positions redeem for the
//! payout fixed at purchase.
//!
//! # Architecture
//!
//! - **`domain`** - Markets, pools, positions, and the pricing math
//! - **`port`** - Clock, custody ledger and notifier traits
//! - **`application`** - The [`Exchange`](application::Exchange) service
//! - **`adapter`** - CLI and scenario replay (inbound), clocks and ledgers (outbound)
//! - **`infrastructure`** - Configuration, logging and wiring
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use oddsmaker::adapter::outbound::{InMemoryLedger, ManualClock};
//! use oddsmaker::application::Exchange;
//! use oddsmaker::domain::{AccountId, MarketParams, Side, BPS_DENOMINATOR};
//!
//! let ledger = Arc::new(InMemoryLedger::new());
//! let exchange = Exchange::new(Arc::new(ManualClock::new(0)), ledger.clone());
//!
//! let alice = AccountId::new("alice");
//! ledger.mint(&alice, 1_100_000).unwrap();
//! let market = exchange
//!     .create_market(
//!         &alice,
//!         MarketParams {
//!             description: "Will it rain?".into(),
//!             category: "weather".into(),
//!             resolution_source: "met office".into(),
//!             resolution_time_ms: 0,
//!             min_bet: 100,
//!             max_bet: 200_000,
//!             fee_rate_bps: 0,
//!         },
//!     )
//!     .unwrap();
//! let pool = exchange.create_pool(&alice, market, 1_000_000, 0).unwrap();
//!
//! let position = exchange
//!     .place_bet(&alice, pool, Side::Yes, 100_000, BPS_DENOMINATOR)
//!     .unwrap();
//! assert_eq!(position.potential_payout(), 200_000);
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
