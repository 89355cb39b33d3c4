//! Canonical test configurations.

use crate::infrastructure::config::exchange::ExchangeConfig;
use crate::infrastructure::config::settings::Config;

/// Fee-free exchange defaults with a wide bet range.
pub fn exchange() -> ExchangeConfig {
    ExchangeConfig {
        default_min_bet: 100,
        default_max_bet: 200_000,
        default_treasury_fee_bps: 0,
        default_pool_fee_bps: 0,
        max_fee_bps: 1_000,
    }
}

/// Full configuration around [`exchange`].
pub fn config() -> Config {
    Config {
        exchange: exchange(),
        ..Config::default()
    }
}
