//! Scripted scenarios replayed against an in-memory exchange.
//!
//! A scenario is a TOML file with funded accounts and an ordered list of
//! steps. Markets, pools and positions are bound to labels so later steps can
//! refer to them. A step may declare the error code it expects; any other
//! failure aborts the run.
//!
//! ```toml
//! [[accounts]]
//! name = "alice"
//! balance = 200000
//!
//! [[steps]]
//! action = "create_market"
//! label = "rain"
//! caller = "alice"
//! description = "Will it rain?"
//! resolution_time_ms = 1000
//!
//! [[steps]]
//! action = "create_pool"
//! label = "rain-pool"
//! market = "rain"
//! caller = "alice"
//! seed = 100000
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::outbound::clock::ManualClock;
use crate::adapter::outbound::ledger::InMemoryLedger;
use crate::application::Exchange;
use crate::domain::{
    AccountId, Amount, Bps, ExchangeError, MarketId, MarketParams, Odds, PoolId, PoolSnapshot,
    Position, PositionId, Side, BPS_DENOMINATOR,
};
use crate::error::ScenarioError;
use crate::infrastructure::bootstrap::build_exchange;
use crate::infrastructure::config::settings::Config;
use crate::port::Ledger;

/// A parsed scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Clock reading when the run starts.
    #[serde(default)]
    pub start_ms: u64,
    #[serde(default)]
    pub accounts: Vec<AccountSpec>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// An account funded before the first step.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSpec {
    pub name: String,
    pub balance: Amount,
}

/// One step plus its optional expected error code.
#[derive(Debug, Clone, Deserialize)]
pub struct StepSpec {
    #[serde(flatten)]
    pub action: Action,
    /// Error code the step must fail with, e.g. `slippage_exceeded`.
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// Engine operations a scenario can script.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    CreateMarket {
        label: String,
        caller: String,
        description: String,
        #[serde(default)]
        category: String,
        #[serde(default)]
        resolution_source: String,
        resolution_time_ms: u64,
        min_bet: Option<Amount>,
        max_bet: Option<Amount>,
        fee_rate_bps: Option<Bps>,
    },
    CreatePool {
        label: String,
        market: String,
        caller: String,
        seed: Amount,
        fee_rate_bps: Option<Bps>,
    },
    Bet {
        label: String,
        pool: String,
        caller: String,
        side: Side,
        stake: Amount,
        max_slippage_bps: Option<Bps>,
    },
    Quote {
        pool: String,
    },
    Close {
        market: String,
        caller: String,
    },
    Advance {
        ms: u64,
    },
    Resolve {
        market: String,
        caller: String,
        outcome: Side,
    },
    Dispute {
        market: String,
    },
    Transfer {
        position: String,
        to: String,
    },
    Redeem {
        position: String,
    },
    Sweep {
        pool: String,
        caller: String,
    },
}

impl Action {
    /// Snake-case action name as written in the scenario file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateMarket { .. } => "create_market",
            Self::CreatePool { .. } => "create_pool",
            Self::Bet { .. } => "bet",
            Self::Quote { .. } => "quote",
            Self::Close { .. } => "close",
            Self::Advance { .. } => "advance",
            Self::Resolve { .. } => "resolve",
            Self::Dispute { .. } => "dispute",
            Self::Transfer { .. } => "transfer",
            Self::Redeem { .. } => "redeem",
            Self::Sweep { .. } => "sweep",
        }
    }
}

impl Scenario {
    /// Parse a scenario from TOML content.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::Parse`] for malformed content.
    pub fn parse_toml(content: &str) -> Result<Self, ScenarioError> {
        toml::from_str(content).map_err(ScenarioError::Parse)
    }

    /// Load a scenario file.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::ReadFile`] or [`ScenarioError::Parse`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(ScenarioError::ReadFile)?;
        Self::parse_toml(&content)
    }
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    MarketCreated {
        market_id: MarketId,
    },
    PoolCreated {
        pool_id: PoolId,
        odds: Odds,
    },
    BetPlaced {
        position_id: PositionId,
        side: Side,
        stake: Amount,
        odds_at_purchase: Bps,
        potential_payout: Amount,
        odds_after: Odds,
    },
    Quoted {
        pool_id: PoolId,
        odds: Odds,
        /// Implied YES probability as a decimal fraction.
        yes_probability: Decimal,
    },
    MarketClosed {
        market_id: MarketId,
    },
    ClockAdvanced {
        now_ms: u64,
    },
    MarketResolved {
        market_id: MarketId,
        outcome: Side,
    },
    MarketDisputed {
        market_id: MarketId,
    },
    Transferred {
        position_id: PositionId,
        owner: AccountId,
    },
    Redeemed {
        position_id: PositionId,
        owner: AccountId,
        win: bool,
        payout: Amount,
    },
    Swept {
        pool_id: PoolId,
        amount: Amount,
    },
    /// The step failed with the error it declared.
    Rejected {
        code: &'static str,
        message: String,
    },
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarketCreated { market_id } => write!(f, "{market_id} open"),
            Self::PoolCreated { pool_id, odds } => write!(f, "{pool_id} seeded at {odds}"),
            Self::BetPlaced {
                position_id,
                side,
                stake,
                odds_at_purchase,
                potential_payout,
                odds_after,
            } => write!(
                f,
                "{position_id} {side} {stake} @ {odds_at_purchase} bps, pays {potential_payout}, now {odds_after}"
            ),
            Self::Quoted {
                pool_id,
                odds,
                yes_probability,
            } => write!(f, "{pool_id} {odds} (p(yes) = {yes_probability})"),
            Self::MarketClosed { market_id } => write!(f, "{market_id} closed"),
            Self::ClockAdvanced { now_ms } => write!(f, "now {now_ms} ms"),
            Self::MarketResolved { market_id, outcome } => {
                write!(f, "{market_id} resolved {outcome}")
            }
            Self::MarketDisputed { market_id } => write!(f, "{market_id} disputed"),
            Self::Transferred { position_id, owner } => write!(f, "{position_id} -> {owner}"),
            Self::Redeemed {
                position_id,
                owner,
                win,
                payout,
            } => {
                let verdict = if *win { "won" } else { "lost" };
                write!(f, "{position_id} {verdict}, {payout} to {owner}")
            }
            Self::Swept { pool_id, amount } => write!(f, "{amount} swept from {pool_id}"),
            Self::Rejected { code, message } => write!(f, "{code}: {message}"),
        }
    }
}

/// One executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// 1-based position in the scenario.
    pub step: usize,
    pub action: &'static str,
    pub outcome: StepOutcome,
}

/// Final state after a run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepReport>,
    pub pools: Vec<PoolSnapshot>,
    pub balances: Vec<AccountBalance>,
    /// Labels of positions still held at the end of the run.
    pub open_positions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    pub account: AccountId,
    pub balance: Amount,
}

/// Replays scenarios against a fresh exchange.
pub struct ScenarioRunner {
    config: Config,
    exchange: Exchange,
    clock: Arc<ManualClock>,
    ledger: Arc<InMemoryLedger>,
    markets: HashMap<String, MarketId>,
    pools: HashMap<String, PoolId>,
    positions: HashMap<String, Position>,
    accounts: Vec<AccountId>,
}

impl ScenarioRunner {
    /// Create a runner whose exchange is wired from `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let clock = Arc::new(ManualClock::new(0));
        let ledger = Arc::new(InMemoryLedger::new());
        let exchange = build_exchange(&config, clock.clone(), ledger.clone());
        Self {
            config,
            exchange,
            clock,
            ledger,
            markets: HashMap::new(),
            pools: HashMap::new(),
            positions: HashMap::new(),
            accounts: Vec::new(),
        }
    }

    /// The exchange under test.
    #[must_use]
    pub const fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    /// Run every step in order.
    ///
    /// # Errors
    ///
    /// The first step that fails without declaring that error, or that
    /// succeeds despite declaring one.
    pub fn run(&mut self, scenario: &Scenario) -> Result<ScenarioReport, ScenarioError> {
        self.clock.set(scenario.start_ms);
        for account in &scenario.accounts {
            let id = AccountId::new(account.name.as_str());
            self.ledger
                .mint(&id, account.balance)
                .map_err(|source| ScenarioError::Funding {
                    account: account.name.clone(),
                    source,
                })?;
            self.track(&id);
        }

        let mut steps = Vec::with_capacity(scenario.steps.len());
        for (index, entry) in scenario.steps.iter().enumerate() {
            let step = index + 1;
            let outcome = self.run_step(step, entry)?;
            debug!(step, action = entry.action.name(), "Scenario step done");
            steps.push(StepReport {
                step,
                action: entry.action.name(),
                outcome,
            });
        }

        Ok(self.report(steps))
    }

    fn run_step(&mut self, step: usize, entry: &StepSpec) -> Result<StepOutcome, ScenarioError> {
        match (self.apply(step, &entry.action)?, entry.expect_error.as_deref()) {
            (Ok(outcome), None) => Ok(outcome),
            (Ok(_), Some(expected)) => Err(ScenarioError::UnexpectedOutcome {
                step,
                expected: expected.to_string(),
                actual: "success".to_string(),
            }),
            (Err(error), Some(expected)) if error.code() == expected => Ok(StepOutcome::Rejected {
                code: error.code(),
                message: error.to_string(),
            }),
            (Err(error), Some(expected)) => Err(ScenarioError::UnexpectedOutcome {
                step,
                expected: expected.to_string(),
                actual: error.code().to_string(),
            }),
            (Err(error), None) => Err(ScenarioError::Step {
                step,
                source: error,
            }),
        }
    }

    /// Outer error: scenario is malformed. Inner error: the engine said no.
    fn apply(
        &mut self,
        step: usize,
        action: &Action,
    ) -> Result<Result<StepOutcome, ExchangeError>, ScenarioError> {
        let defaults = self.config.exchange.clone();
        let outcome = match action {
            Action::CreateMarket {
                label,
                caller,
                description,
                category,
                resolution_source,
                resolution_time_ms,
                min_bet,
                max_bet,
                fee_rate_bps,
            } => {
                ensure_unbound(step, label, &self.markets)?;
                let caller = AccountId::new(caller.as_str());
                let params = MarketParams {
                    description: description.clone(),
                    category: category.clone(),
                    resolution_source: resolution_source.clone(),
                    resolution_time_ms: *resolution_time_ms,
                    min_bet: min_bet.unwrap_or(defaults.default_min_bet),
                    max_bet: max_bet.unwrap_or(defaults.default_max_bet),
                    fee_rate_bps: fee_rate_bps.unwrap_or(defaults.default_treasury_fee_bps),
                };
                self.exchange.create_market(&caller, params).map(|market_id| {
                    self.markets.insert(label.clone(), market_id);
                    StepOutcome::MarketCreated { market_id }
                })
            }
            Action::CreatePool {
                label,
                market,
                caller,
                seed,
                fee_rate_bps,
            } => {
                ensure_unbound(step, label, &self.pools)?;
                let market_id = lookup(step, market, &self.markets)?;
                let caller = AccountId::new(caller.as_str());
                self.track(&caller);
                let fee = fee_rate_bps.unwrap_or(defaults.default_pool_fee_bps);
                self.exchange
                    .create_pool(&caller, market_id, *seed, fee)
                    .and_then(|pool_id| {
                        self.pools.insert(label.clone(), pool_id);
                        let odds = self.exchange.quote_odds(pool_id)?;
                        Ok(StepOutcome::PoolCreated { pool_id, odds })
                    })
            }
            Action::Bet {
                label,
                pool,
                caller,
                side,
                stake,
                max_slippage_bps,
            } => {
                ensure_unbound(step, label, &self.positions)?;
                let pool_id = lookup(step, pool, &self.pools)?;
                let caller = AccountId::new(caller.as_str());
                self.track(&caller);
                let tolerance = max_slippage_bps.unwrap_or(BPS_DENOMINATOR);
                self.exchange
                    .place_bet(&caller, pool_id, *side, *stake, tolerance)
                    .and_then(|position| {
                        let odds_after = self.exchange.quote_odds(pool_id)?;
                        let outcome = StepOutcome::BetPlaced {
                            position_id: position.id(),
                            side: position.side(),
                            stake: position.amount(),
                            odds_at_purchase: position.odds_at_purchase(),
                            potential_payout: position.potential_payout(),
                            odds_after,
                        };
                        self.positions.insert(label.clone(), position);
                        Ok(outcome)
                    })
            }
            Action::Quote { pool } => {
                let pool_id = lookup(step, pool, &self.pools)?;
                self.exchange
                    .quote_odds(pool_id)
                    .map(|odds| StepOutcome::Quoted {
                        pool_id,
                        odds,
                        yes_probability: odds.probability(Side::Yes),
                    })
            }
            Action::Close { market, caller } => {
                let market_id = lookup(step, market, &self.markets)?;
                self.exchange
                    .close_market(&AccountId::new(caller.as_str()), market_id)
                    .map(|()| StepOutcome::MarketClosed { market_id })
            }
            Action::Advance { ms } => Ok(StepOutcome::ClockAdvanced {
                now_ms: self.clock.advance(*ms),
            }),
            Action::Resolve {
                market,
                caller,
                outcome,
            } => {
                let market_id = lookup(step, market, &self.markets)?;
                self.exchange
                    .resolve_market(&AccountId::new(caller.as_str()), market_id, *outcome)
                    .map(|()| StepOutcome::MarketResolved {
                        market_id,
                        outcome: *outcome,
                    })
            }
            Action::Dispute { market } => {
                let market_id = lookup(step, market, &self.markets)?;
                self.exchange
                    .dispute_market(market_id)
                    .map(|()| StepOutcome::MarketDisputed { market_id })
            }
            Action::Transfer { position, to } => {
                let held = self.take_position(step, position)?;
                let owner = AccountId::new(to.as_str());
                self.track(&owner);
                let held = held.transfer_to(owner.clone());
                let position_id = held.id();
                self.positions.insert(position.clone(), held);
                Ok(StepOutcome::Transferred { position_id, owner })
            }
            Action::Redeem { position } => {
                let held = self.take_position(step, position)?;
                match self.exchange.redeem(held) {
                    Ok(settlement) => Ok(StepOutcome::Redeemed {
                        position_id: settlement.position_id,
                        owner: settlement.owner,
                        win: settlement.win,
                        payout: settlement.payout,
                    }),
                    Err(rejected) => {
                        let (held, error) = rejected.into_parts();
                        self.positions.insert(position.clone(), held);
                        Err(error)
                    }
                }
            }
            Action::Sweep { pool, caller } => {
                let pool_id = lookup(step, pool, &self.pools)?;
                self.exchange
                    .sweep_surplus(&AccountId::new(caller.as_str()), pool_id)
                    .map(|amount| StepOutcome::Swept { pool_id, amount })
            }
        };
        Ok(outcome)
    }

    fn take_position(&mut self, step: usize, label: &str) -> Result<Position, ScenarioError> {
        self.positions
            .remove(label)
            .ok_or_else(|| ScenarioError::UnknownLabel {
                step,
                label: label.to_string(),
            })
    }

    fn track(&mut self, account: &AccountId) {
        if !self.accounts.contains(account) {
            self.accounts.push(account.clone());
        }
    }

    fn report(&self, steps: Vec<StepReport>) -> ScenarioReport {
        let mut pool_ids: Vec<PoolId> = self.pools.values().copied().collect();
        pool_ids.sort_unstable();
        let pools = pool_ids
            .into_iter()
            .filter_map(|id| self.exchange.pool(id).ok())
            .collect();

        let balances = self
            .accounts
            .iter()
            .map(|account| AccountBalance {
                account: account.clone(),
                balance: self.ledger.balance_of(account),
            })
            .collect();

        let mut open_positions: Vec<String> = self.positions.keys().cloned().collect();
        open_positions.sort_unstable();

        ScenarioReport {
            steps,
            pools,
            balances,
            open_positions,
        }
    }
}

fn lookup<T: Copy>(step: usize, label: &str, bound: &HashMap<String, T>) -> Result<T, ScenarioError> {
    bound
        .get(label)
        .copied()
        .ok_or_else(|| ScenarioError::UnknownLabel {
            step,
            label: label.to_string(),
        })
}

fn ensure_unbound<T>(step: usize, label: &str, bound: &HashMap<String, T>) -> Result<(), ScenarioError> {
    if bound.contains_key(label) {
        return Err(ScenarioError::DuplicateLabel {
            step,
            label: label.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const LIFECYCLE: &str = r#"
[[accounts]]
name = "lp"
balance = 1000000

[[accounts]]
name = "alice"
balance = 100000

[[steps]]
action = "create_market"
label = "m"
caller = "lp"
description = "Will it rain?"
resolution_time_ms = 1000
max_bet = 200000
fee_rate_bps = 0

[[steps]]
action = "create_pool"
label = "p"
market = "m"
caller = "lp"
seed = 1000000
fee_rate_bps = 0

[[steps]]
action = "bet"
label = "a"
pool = "p"
caller = "alice"
side = "yes"
stake = 100000

[[steps]]
action = "bet"
label = "b"
pool = "p"
caller = "alice"
side = "no"
stake = 10000
max_slippage_bps = 50
expect_error = "slippage_exceeded"

[[steps]]
action = "close"
market = "m"
caller = "lp"

[[steps]]
action = "redeem"
position = "a"
expect_error = "market_not_resolved"

[[steps]]
action = "advance"
ms = 1000

[[steps]]
action = "resolve"
market = "m"
caller = "lp"
outcome = "yes"

[[steps]]
action = "redeem"
position = "a"
"#;

    fn run(content: &str) -> Result<ScenarioReport, ScenarioError> {
        let scenario = Scenario::parse_toml(content).unwrap();
        ScenarioRunner::new(Config::default()).run(&scenario)
    }

    #[test]
    fn lifecycle_scenario_runs_to_settlement() {
        let report = run(LIFECYCLE).unwrap();

        assert_eq!(report.steps.len(), 9);
        assert!(matches!(
            report.steps[2].outcome,
            StepOutcome::BetPlaced {
                odds_at_purchase: 5_000,
                potential_payout: 200_000,
                ..
            }
        ));
        assert!(matches!(
            report.steps[3].outcome,
            StepOutcome::Rejected {
                code: "slippage_exceeded",
                ..
            }
        ));
        assert!(matches!(
            report.steps[8].outcome,
            StepOutcome::Redeemed {
                win: true,
                payout: 200_000,
                ..
            }
        ));
        let alice = report
            .balances
            .iter()
            .find(|b| b.account.as_str() == "alice")
            .unwrap();
        assert_eq!(alice.balance, 200_000);
        assert!(report.open_positions.is_empty());
        assert_eq!(report.pools[0].custodied_balance, 900_000);
    }

    #[test]
    fn unknown_label_aborts() {
        let content = r#"
[[steps]]
action = "quote"
pool = "nope"
"#;
        assert!(matches!(
            run(content),
            Err(ScenarioError::UnknownLabel { step: 1, .. })
        ));
    }

    #[test]
    fn unexpected_success_aborts() {
        let content = r#"
[[steps]]
action = "create_market"
label = "m"
caller = "lp"
description = "x"
resolution_time_ms = 0
expect_error = "invalid_bet_bounds"
"#;
        assert!(matches!(
            run(content),
            Err(ScenarioError::UnexpectedOutcome { step: 1, .. })
        ));
    }

    #[test]
    fn undeclared_engine_error_aborts() {
        let content = r#"
[[steps]]
action = "create_market"
label = "m"
caller = "lp"
description = "x"
resolution_time_ms = 0
min_bet = 10
max_bet = 1
"#;
        assert!(matches!(
            run(content),
            Err(ScenarioError::Step {
                step: 1,
                source: ExchangeError::InvalidBetBounds { .. }
            })
        ));
    }

    #[test]
    fn overfunded_account_aborts_before_any_step() {
        let content = r#"
[[accounts]]
name = "whale"
balance = 9223372036854775807

[[accounts]]
name = "whale"
balance = 9223372036854775807

[[accounts]]
name = "whale"
balance = 9223372036854775807
"#;
        assert!(matches!(
            run(content),
            Err(ScenarioError::Funding {
                source: ExchangeError::AccountOverflow { .. },
                ..
            })
        ));
    }

    #[test]
    fn quote_reports_yes_probability() {
        let content = r#"
[[accounts]]
name = "lp"
balance = 1000000

[[steps]]
action = "create_market"
label = "m"
caller = "lp"
description = "x"
resolution_time_ms = 0

[[steps]]
action = "create_pool"
label = "p"
market = "m"
caller = "lp"
seed = 1000000

[[steps]]
action = "quote"
pool = "p"
"#;
        let report = run(content).unwrap();
        let StepOutcome::Quoted {
            yes_probability, ..
        } = &report.steps[2].outcome
        else {
            panic!("expected a quote, got {:?}", report.steps[2].outcome);
        };
        assert_eq!(*yes_probability, dec!(0.5));

        let json = serde_json::to_value(&report.steps[2].outcome).unwrap();
        assert_eq!(json["yes_probability"], "0.5000");
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let content = r#"
[[steps]]
action = "create_market"
label = "m"
caller = "lp"
description = "x"
resolution_time_ms = 0

[[steps]]
action = "create_market"
label = "m"
caller = "lp"
description = "y"
resolution_time_ms = 0
"#;
        assert!(matches!(
            run(content),
            Err(ScenarioError::DuplicateLabel { step: 2, .. })
        ));
    }
}
