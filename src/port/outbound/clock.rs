//! Clock port.
//!
//! The engine never reads wall-clock time directly. Resolution deadlines and
//! purchase timestamps use whatever reading this port supplies.

/// Millisecond timestamp source.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}
