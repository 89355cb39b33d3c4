//! Command-line interface definitions.
//!
//! Defines the `oddsmaker` CLI using `clap`: scenario replay against an
//! in-memory exchange, and configuration inspection.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Binary-outcome prediction market engine
#[derive(Parser, Debug)]
#[command(name = "oddsmaker")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scripted scenario against a fresh in-memory exchange
    Simulate(SimulateArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `oddsmaker simulate`.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Scenario TOML file
    pub scenario: PathBuf,
}

/// Subcommands for `oddsmaker config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied
    Show,
    /// Validate the configuration file
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simulate_with_global_flags() {
        let cli = Cli::try_parse_from(["oddsmaker", "simulate", "s.toml", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Simulate(args) => assert_eq!(args.scenario, PathBuf::from("s.toml")),
            Commands::Config(_) => panic!("expected simulate"),
        }
    }

    #[test]
    fn parses_config_check_with_path() {
        let cli = Cli::try_parse_from(["oddsmaker", "--config", "c.toml", "config", "check"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Check)));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
