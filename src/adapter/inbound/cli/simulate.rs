//! Handler for `oddsmaker simulate`.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::scenario::{Scenario, ScenarioReport, ScenarioRunner, StepOutcome};
use crate::domain::Side;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Replay `path` against a fresh exchange and print every step.
///
/// # Errors
///
/// Unreadable or malformed scenarios, and steps that fail unexpectedly.
pub fn execute(config: Config, path: &Path) -> Result<ScenarioReport> {
    let scenario = Scenario::load(path)?;
    output::section("Simulation");
    output::field("Scenario", path.display());
    output::field("Steps", scenario.steps.len());

    let report = ScenarioRunner::new(config).run(&scenario)?;

    output::section("Steps");
    for step in &report.steps {
        let expected_failure = matches!(step.outcome, StepOutcome::Rejected { .. });
        output::step(step.step, step.action, step, &step.outcome, expected_failure);
    }

    print_summary(&report);
    output::success(&format!("{} steps replayed", report.steps.len()));
    Ok(report)
}

fn print_summary(report: &ScenarioReport) {
    output::section("Pools");
    for pool in &report.pools {
        output::record("pool", pool);
        if output::is_json() {
            continue;
        }
        output::field(&pool.id.to_string(), pool.odds);
        output::field("  p(yes)", pool.odds.probability(Side::Yes));
        output::field("  reserves", format!("{} / {}", pool.yes_reserve, pool.no_reserve));
        output::field("  custody", pool.custodied_balance);
        output::field(
            "  liability",
            format!("{} yes / {} no", pool.yes_liability, pool.no_liability),
        );
        output::field("  fees", format!("{} pool / {} treasury", pool.fees_collected, pool.treasury_fees));
        if output::verbosity() > 0 {
            output::field("  k", pool.k);
            output::field("  outstanding", pool.outstanding_positions);
        }
    }

    output::section("Balances");
    for balance in &report.balances {
        output::record("balance", balance);
        if !output::is_json() {
            output::field(balance.account.as_str(), balance.balance);
        }
    }

    if !report.open_positions.is_empty() {
        output::note(&format!("unredeemed: {}", report.open_positions.join(", ")));
    }
}
