//! Handler for the `config` command group.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Load the configuration from `path`, or defaults when no path was given.
///
/// # Errors
///
/// Read, parse or validation failures.
pub fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

/// Execute `config show`.
pub fn execute_show(config: &Config) {
    if output::is_json() {
        output::record("config", config);
        return;
    }

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", format!("{:?}", config.logging.format).to_lowercase());

    let exchange = &config.exchange;
    output::section("Exchange");
    output::field("Min bet", exchange.default_min_bet);
    output::field("Max bet", exchange.default_max_bet);
    output::field("Treasury fee", format!("{} bps", exchange.default_treasury_fee_bps));
    output::field("Pool fee", format!("{} bps", exchange.default_pool_fee_bps));
    output::field("Max fee", format!("{} bps", exchange.max_fee_bps));
}

/// Execute `config check`.
///
/// # Errors
///
/// The first validation failure.
pub fn execute_check(path: Option<&Path>) -> Result<()> {
    output::section("Config Validation");
    match path {
        Some(path) => output::field("Path", path.display()),
        None => output::note("no --config given, checking defaults"),
    }
    let config = load(path)?;
    config.validate()?;
    output::success("Configuration is valid");
    Ok(())
}
