//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for accounts and market parameters.
//! - [`config`] - Canonical test configurations.
//! - [`notifier`] - [`RecordingNotifier`](notifier::RecordingNotifier) for event assertions.
//! - [`harness`] - A fully wired exchange with a manual clock and funded ledger.

pub mod config;
pub mod domain;
pub mod harness;
pub mod notifier;
