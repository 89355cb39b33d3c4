//! Composition root: wire an [`Exchange`] from configuration.

use std::sync::Arc;

use tracing::info;

use crate::application::{Exchange, ExchangePolicy};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::notifier::LogNotifier;
use crate::port::{Clock, Ledger};

/// Build an exchange with the configured policy and a logging notifier.
#[must_use]
pub fn build_exchange(config: &Config, clock: Arc<dyn Clock>, ledger: Arc<dyn Ledger>) -> Exchange {
    let policy = ExchangePolicy::from(&config.exchange);
    info!(max_fee_bps = policy.max_fee_bps, "Exchange initialised");
    Exchange::new(clock, ledger)
        .with_policy(policy)
        .with_notifier(Box::new(LogNotifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::clock::ManualClock;
    use crate::adapter::outbound::ledger::InMemoryLedger;

    #[test]
    fn policy_follows_config() {
        let mut config = Config::default();
        config.exchange.max_fee_bps = 123;
        let exchange = build_exchange(
            &config,
            Arc::new(ManualClock::new(0)),
            Arc::new(InMemoryLedger::new()),
        );
        assert_eq!(exchange.policy().max_fee_bps, 123);
    }
}
