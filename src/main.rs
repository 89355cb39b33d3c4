use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use oddsmaker::adapter::inbound::cli::command::{Cli, Commands, ConfigCommand};
use oddsmaker::adapter::inbound::cli::output::{self, OutputConfig};
use oddsmaker::adapter::inbound::cli::{config, simulate};
use oddsmaker::error::Result;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.config.as_deref();

    if let Commands::Config(ConfigCommand::Check) = cli.command {
        return config::execute_check(path);
    }

    let mut settings = config::load(path)?;
    match (cli.quiet, cli.verbose) {
        (true, _) => settings.logging.level = "error".into(),
        (false, 0) => {}
        (false, 1) => settings.logging.level = "debug".into(),
        (false, _) => settings.logging.level = "trace".into(),
    }
    settings.init_logging();
    debug!(config = ?path, "Configuration loaded");

    match cli.command {
        Commands::Simulate(args) => {
            output::header(env!("CARGO_PKG_VERSION"));
            simulate::execute(settings, &args.scenario).map(drop)
        }
        Commands::Config(ConfigCommand::Show) => {
            config::execute_show(&settings);
            Ok(())
        }
        Commands::Config(ConfigCommand::Check) => config::execute_check(path),
    }
}
