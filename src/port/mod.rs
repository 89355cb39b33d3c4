//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to plug the engine into its
//! surroundings.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │       (Exchange)        │
//!     ┌──────────────┤   Domain + Port         ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │  Clock  │            │   Ledger    │              │ Notifier  │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`Clock`] - Millisecond time source for deadlines and timestamps
//! - [`Ledger`] - Custody of the fungible asset backing stakes and payouts
//! - [`Notifier`] - Fire-and-forget event delivery

pub mod outbound;

pub use outbound::clock::Clock;
pub use outbound::ledger::{DepositRejected, Ledger};
pub use outbound::notifier::{
    BetEvent, Event, LogNotifier, Notifier, NotifierRegistry, NullNotifier, SettlementEvent,
    TransitionEvent,
};
