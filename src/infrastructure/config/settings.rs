//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Every section is optional; a missing file section falls back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use oddsmaker::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::exchange::ExchangeConfig;
use super::logging::LoggingConfig;
use crate::domain::BPS_DENOMINATOR;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Market and pool defaults plus creation limits.
    #[serde(default)]
    pub exchange: ExchangeConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first out-of-range field.
    pub fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "logging.level",
            }
            .into());
        }

        let exchange = &self.exchange;
        if exchange.max_fee_bps > BPS_DENOMINATOR {
            return Err(ConfigError::InvalidValue {
                field: "max_fee_bps",
                reason: format!("must be at most {BPS_DENOMINATOR}"),
            }
            .into());
        }
        if exchange.default_min_bet == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_min_bet",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if exchange.default_max_bet < exchange.default_min_bet {
            return Err(ConfigError::InvalidValue {
                field: "default_max_bet",
                reason: "must be >= default_min_bet".to_string(),
            }
            .into());
        }
        if exchange.default_treasury_fee_bps > exchange.max_fee_bps {
            return Err(ConfigError::InvalidValue {
                field: "default_treasury_fee_bps",
                reason: "must be <= max_fee_bps".to_string(),
            }
            .into());
        }
        if exchange.default_pool_fee_bps > exchange.max_fee_bps {
            return Err(ConfigError::InvalidValue {
                field: "default_pool_fee_bps",
                reason: "must be <= max_fee_bps".to_string(),
            }
            .into());
        }
        if exchange.default_treasury_fee_bps + exchange.default_pool_fee_bps > BPS_DENOMINATOR {
            return Err(ConfigError::InvalidValue {
                field: "default_pool_fee_bps",
                reason: format!("combined with the treasury fee must not exceed {BPS_DENOMINATOR}"),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
