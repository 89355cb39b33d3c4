//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the collaborators the engine depends on but does
//! not own: time, custody and event delivery.

pub mod clock;
pub mod ledger;
pub mod notifier;
