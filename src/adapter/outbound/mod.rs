//! Outbound adapters (driven side).

pub mod clock;
pub mod ledger;

pub use clock::{ManualClock, SystemClock};
pub use ledger::InMemoryLedger;
