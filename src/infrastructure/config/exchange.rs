//! Exchange defaults and creation limits.

use serde::{Deserialize, Serialize};

use crate::application::ExchangePolicy;
use crate::domain::{Amount, Bps, BPS_DENOMINATOR};

/// Exchange configuration.
///
/// The `default_*` values fill in market and pool parameters a request (or
/// scenario step) leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExchangeConfig {
    /// Smallest accepted stake.
    #[serde(default = "default_min_bet")]
    pub default_min_bet: Amount,
    /// Largest accepted stake.
    #[serde(default = "default_max_bet")]
    pub default_max_bet: Amount,
    /// Treasury fee charged on every stake, in basis points.
    #[serde(default)]
    pub default_treasury_fee_bps: Bps,
    /// Pool fee charged on every stake, in basis points.
    #[serde(default = "default_pool_fee_bps")]
    pub default_pool_fee_bps: Bps,
    /// Ceiling applied to either fee rate at creation.
    #[serde(default = "default_max_fee_bps")]
    pub max_fee_bps: Bps,
}

const fn default_min_bet() -> Amount {
    100
}

const fn default_max_bet() -> Amount {
    1_000_000
}

const fn default_pool_fee_bps() -> Bps {
    30
}

const fn default_max_fee_bps() -> Bps {
    1_000
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            default_min_bet: default_min_bet(),
            default_max_bet: default_max_bet(),
            default_treasury_fee_bps: 0,
            default_pool_fee_bps: default_pool_fee_bps(),
            max_fee_bps: default_max_fee_bps(),
        }
    }
}

impl From<&ExchangeConfig> for ExchangePolicy {
    fn from(config: &ExchangeConfig) -> Self {
        Self {
            max_fee_bps: config.max_fee_bps.min(BPS_DENOMINATOR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_uses_defaults() {
        let config: ExchangeConfig = toml::from_str("").unwrap();
        assert_eq!(config, ExchangeConfig::default());
        assert_eq!(config.default_pool_fee_bps, 30);
    }

    #[test]
    fn policy_takes_fee_ceiling() {
        let config = ExchangeConfig {
            max_fee_bps: 250,
            ..ExchangeConfig::default()
        };
        assert_eq!(ExchangePolicy::from(&config).max_fee_bps, 250);
    }
}
