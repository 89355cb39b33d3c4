use thiserror::Error;

use crate::domain::error::ExchangeError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised while loading or running a scenario file.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("step {step}: unknown label '{label}'")]
    UnknownLabel { step: usize, label: String },

    #[error("step {step}: label '{label}' already bound")]
    DuplicateLabel { step: usize, label: String },

    #[error("step {step}: expected error '{expected}', got {actual}")]
    UnexpectedOutcome {
        step: usize,
        expected: String,
        actual: String,
    },

    #[error("cannot fund account '{account}': {source}")]
    Funding {
        account: String,
        #[source]
        source: ExchangeError,
    },

    #[error("step {step}: {source}")]
    Step {
        step: usize,
        #[source]
        source: ExchangeError,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
