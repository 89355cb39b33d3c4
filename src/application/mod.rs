//! Application services (use cases).
//!
//! The exchange service orchestrates the domain's market and pool logic and
//! coordinates the outbound ports (clock, ledger, notifiers).

pub mod exchange;
pub mod registry;

pub use exchange::{Exchange, ExchangePolicy, RedeemRejected, Settlement};
pub use registry::{MarketBook, Registry};
