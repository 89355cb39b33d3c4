//! Builders for domain primitives used across tests.

use crate::domain::{AccountId, Amount, Bps, MarketParams};

/// Create an [`AccountId`] from a string.
pub fn account(name: &str) -> AccountId {
    AccountId::new(name)
}

/// Fee-free market parameters accepting stakes in `[100, 200_000]`.
pub fn market_params(resolution_time_ms: u64) -> MarketParams {
    MarketParams {
        description: "Will it rain in Lisbon tomorrow?".to_string(),
        category: "weather".to_string(),
        resolution_source: "IPMA daily report".to_string(),
        resolution_time_ms,
        min_bet: 100,
        max_bet: 200_000,
        fee_rate_bps: 0,
    }
}

/// Market parameters with explicit bounds and treasury fee.
pub fn market_params_with(min_bet: Amount, max_bet: Amount, fee_rate_bps: Bps) -> MarketParams {
    MarketParams {
        min_bet,
        max_bet,
        fee_rate_bps,
        ..market_params(0)
    }
}
