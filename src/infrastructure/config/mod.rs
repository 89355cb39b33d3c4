//! Infrastructure configuration modules.

pub mod exchange;
pub mod logging;
pub mod settings;

pub use exchange::ExchangeConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use settings::Config;
