//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Market identifier - newtype for type safety.
///
/// Allocated by the exchange; the inner u64 is private.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarketId(u64);

impl MarketId {
    /// Create a new `MarketId` from a u64 value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "market-{}", self.0)
    }
}

/// Identifies one exchange instance within a process.
///
/// Market, pool and position ids restart at 1 in every exchange, so a
/// position also records which exchange minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExchangeId(u64);

impl ExchangeId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exchange-{}", self.0)
    }
}

/// Liquidity pool identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(u64);

impl PoolId {
    /// Create a new `PoolId` from a u64 value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool-{}", self.0)
    }
}

/// Unique position identifier.
///
/// The inner u64 is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionId(u64);

impl PositionId {
    /// Create a new `PositionId` from a u64 value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pos-{}", self.0)
    }
}

/// Caller / owner identity.
///
/// Opaque to the engine: only compared for equality (creator checks) and
/// used as the address for custody transfers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new `AccountId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the account ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Reference to an external yield strategy a position token may opt into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyId(String);

impl StrategyId {
    /// Create a new `StrategyId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the strategy ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StrategyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_id_new_and_value() {
        let id = MarketId::new(7);
        assert_eq!(id.value(), 7);
    }

    #[test]
    fn market_id_display() {
        assert_eq!(format!("{}", MarketId::new(3)), "market-3");
    }

    #[test]
    fn pool_id_display() {
        assert_eq!(format!("{}", PoolId::new(12)), "pool-12");
    }

    #[test]
    fn position_id_new_and_value() {
        let id = PositionId::new(42);
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn position_id_display() {
        let id = PositionId::new(123);
        assert_eq!(format!("{}", id), "pos-123");
    }

    #[test]
    fn account_id_from_str() {
        let id = AccountId::from("alice");
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn account_id_equality_is_by_value() {
        assert_eq!(AccountId::from("bob".to_string()), AccountId::new("bob"));
        assert_ne!(AccountId::new("bob"), AccountId::new("Bob"));
    }

    #[test]
    fn strategy_id_display() {
        let id = StrategyId::from("vault-a");
        assert_eq!(format!("{}", id), "vault-a");
    }
}
