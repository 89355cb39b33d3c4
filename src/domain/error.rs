//! Exchange errors for the pricing and settlement engine.
//!
//! Every error is a hard reject of the whole operation: the engine checks
//! all preconditions before mutating anything, so a caller receiving one of
//! these can retry with adjusted parameters against unchanged state.
//!
//! # Examples
//!
//! ```
//! use oddsmaker::domain::error::{ErrorKind, ExchangeError};
//!
//! let err = ExchangeError::SlippageExceeded { drift: 902, max: 50 };
//! assert_eq!(err.kind(), ErrorKind::Slippage);
//! ```

use thiserror::Error;

use super::id::{AccountId, MarketId, PoolId, PositionId};
use super::market::MarketStatus;
use super::money::{Amount, Bps};

/// Coarse error taxonomy used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong caller for a creator-gated operation.
    Authorization,
    /// Operation invalid for the current market or pool status.
    State,
    /// Bet size outside configured bounds.
    Bounds,
    /// Post-trade odds drifted beyond the caller's tolerance.
    Slippage,
    /// Custodied funds cannot cover an obligation.
    Solvency,
    /// Rejected creation parameters or arithmetic limits.
    Validation,
    /// Unknown market, pool or position.
    NotFound,
    /// The caller's custody account cannot fund the operation.
    Funds,
}

/// Errors raised by market, pool and position operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// Creator-only operation attempted by someone else.
    #[error("{caller} is not the creator of this market")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
    },

    /// Closing a market that is not open.
    #[error("market is already closed (status {status})")]
    AlreadyClosed {
        /// Status at the time of the call.
        status: MarketStatus,
    },

    /// Resolving a market that has not been closed.
    #[error("market must be closed before it can be resolved (status {status})")]
    NotClosed {
        /// Status at the time of the call.
        status: MarketStatus,
    },

    /// Disputing a market that is not resolved.
    #[error("only a resolved market can be disputed (status {status})")]
    NotResolved {
        /// Status at the time of the call.
        status: MarketStatus,
    },

    /// Resolution attempted before the deadline.
    #[error("resolution time {resolution_time_ms} has not been reached (now {now_ms})")]
    BeforeResolutionTime {
        /// The market's resolution deadline.
        resolution_time_ms: u64,
        /// Clock reading at the time of the call.
        now_ms: u64,
    },

    /// Betting or pool creation against a market that is not open.
    #[error("market is not open (status {status})")]
    MarketNotOpen {
        /// Status at the time of the call.
        status: MarketStatus,
    },

    /// Redemption against a market that is not resolved.
    #[error("market is not resolved (status {status})")]
    MarketNotResolved {
        /// Status at the time of the call.
        status: MarketStatus,
    },

    /// Stake outside the market's configured bounds.
    #[error("bet amount {amount} outside bounds [{min}, {max}]")]
    InvalidBetAmount {
        /// The rejected stake.
        amount: Amount,
        /// Minimum allowed stake.
        min: Amount,
        /// Maximum allowed stake.
        max: Amount,
    },

    /// Post-trade odds moved further than the caller allowed.
    #[error("slippage {drift} bps exceeds tolerance {max} bps")]
    SlippageExceeded {
        /// Absolute drift between pre- and post-trade odds.
        drift: Bps,
        /// Caller's tolerance.
        max: Bps,
    },

    /// Custody cannot cover a due payout. Never expected under correct accounting.
    #[error("custodied balance {available} cannot cover payout {required}")]
    InsufficientCustody {
        /// Payout due.
        required: Amount,
        /// Balance held by the pool.
        available: Amount,
    },

    /// A bet would leave the pool unable to cover its worst-case payout.
    #[error("bet would raise worst-case liability to {liability} above custody {custody}")]
    Insolvent {
        /// Worst-case liability after the bet.
        liability: Amount,
        /// Custody after the bet.
        custody: Amount,
    },

    /// A reserve would reach zero, or the quoted odds for the side are zero.
    #[error("pool reserves exhausted")]
    PoolExhausted,

    /// An amount no longer fits the native width.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// Fee rate above the allowed ceiling.
    #[error("fee rate {fee_rate_bps} bps exceeds maximum {max} bps")]
    InvalidFeeRate {
        /// The rejected rate.
        fee_rate_bps: Bps,
        /// The ceiling.
        max: Bps,
    },

    /// Bet bounds that admit no stake.
    #[error("invalid bet bounds: min {min}, max {max}")]
    InvalidBetBounds {
        /// Configured minimum.
        min: Amount,
        /// Configured maximum.
        max: Amount,
    },

    /// Seed liquidity too small to give both sides a non-zero reserve.
    #[error("seed amount {amount} too small, need at least 2")]
    InsufficientSeed {
        /// The rejected seed.
        amount: Amount,
    },

    /// No market registered under this id.
    #[error("market {0} not found")]
    MarketNotFound(MarketId),

    /// No pool registered under this id.
    #[error("pool {0} not found")]
    PoolNotFound(PoolId),

    /// The market already has a pool bound to it.
    #[error("market {market_id} already has pool {pool_id}")]
    PoolAlreadyExists {
        /// The market.
        market_id: MarketId,
        /// The pool already bound to it.
        pool_id: PoolId,
    },

    /// Position id not outstanding against its pool.
    #[error("position {0} is not outstanding")]
    UnknownPosition(PositionId),

    /// The caller's custody account cannot fund the withdrawal.
    #[error("account {owner} holds {available}, needs {required}")]
    InsufficientFunds {
        /// The account being debited.
        owner: AccountId,
        /// Amount requested.
        required: Amount,
        /// Amount available.
        available: Amount,
    },

    /// Crediting the account would overflow its balance.
    #[error("account {owner} holds {held}, cannot accept {incoming} more")]
    AccountOverflow {
        /// The account being credited.
        owner: AccountId,
        /// Balance before the credit.
        held: Amount,
        /// Amount offered.
        incoming: Amount,
    },
}

impl ExchangeError {
    /// Map this error onto the coarse taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::AlreadyClosed { .. }
            | Self::NotClosed { .. }
            | Self::NotResolved { .. }
            | Self::BeforeResolutionTime { .. }
            | Self::MarketNotOpen { .. }
            | Self::MarketNotResolved { .. }
            | Self::PoolAlreadyExists { .. }
            | Self::PoolExhausted => ErrorKind::State,
            Self::InvalidBetAmount { .. } => ErrorKind::Bounds,
            Self::SlippageExceeded { .. } => ErrorKind::Slippage,
            Self::InsufficientCustody { .. } | Self::Insolvent { .. } => ErrorKind::Solvency,
            Self::ArithmeticOverflow
            | Self::InvalidFeeRate { .. }
            | Self::InvalidBetBounds { .. }
            | Self::InsufficientSeed { .. } => ErrorKind::Validation,
            Self::MarketNotFound(_) | Self::PoolNotFound(_) | Self::UnknownPosition(_) => {
                ErrorKind::NotFound
            }
            Self::InsufficientFunds { .. } | Self::AccountOverflow { .. } => ErrorKind::Funds,
        }
    }

    /// Stable snake_case code, used by scenario files and JSON output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::AlreadyClosed { .. } => "already_closed",
            Self::NotClosed { .. } => "not_closed",
            Self::NotResolved { .. } => "not_resolved",
            Self::BeforeResolutionTime { .. } => "before_resolution_time",
            Self::MarketNotOpen { .. } => "market_not_open",
            Self::MarketNotResolved { .. } => "market_not_resolved",
            Self::InvalidBetAmount { .. } => "invalid_bet_amount",
            Self::SlippageExceeded { .. } => "slippage_exceeded",
            Self::InsufficientCustody { .. } => "insufficient_custody",
            Self::Insolvent { .. } => "insolvent",
            Self::PoolExhausted => "pool_exhausted",
            Self::ArithmeticOverflow => "arithmetic_overflow",
            Self::InvalidFeeRate { .. } => "invalid_fee_rate",
            Self::InvalidBetBounds { .. } => "invalid_bet_bounds",
            Self::InsufficientSeed { .. } => "insufficient_seed",
            Self::MarketNotFound(_) => "market_not_found",
            Self::PoolNotFound(_) => "pool_not_found",
            Self::PoolAlreadyExists { .. } => "pool_already_exists",
            Self::UnknownPosition(_) => "unknown_position",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::AccountOverflow { .. } => "account_overflow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_errors_are_state_kind() {
        let err = ExchangeError::NotClosed {
            status: MarketStatus::Open,
        };
        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(err.code(), "not_closed");
    }

    #[test]
    fn solvency_errors_share_kind() {
        let custody = ExchangeError::InsufficientCustody {
            required: 10,
            available: 5,
        };
        let insolvent = ExchangeError::Insolvent {
            liability: 10,
            custody: 5,
        };
        assert_eq!(custody.kind(), ErrorKind::Solvency);
        assert_eq!(insolvent.kind(), ErrorKind::Solvency);
    }

    #[test]
    fn display_includes_structured_fields() {
        let err = ExchangeError::InvalidBetAmount {
            amount: 50,
            min: 100,
            max: 10_000,
        };
        assert_eq!(err.to_string(), "bet amount 50 outside bounds [100, 10000]");
    }

    #[test]
    fn unauthorized_names_the_caller() {
        let err = ExchangeError::Unauthorized {
            caller: AccountId::new("mallory"),
        };
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(err.to_string().contains("mallory"));
    }
}
