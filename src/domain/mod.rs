//! Exchange-agnostic domain logic: markets, pools, positions and the
//! fixed-point arithmetic they share.

pub mod balance;
pub mod error;
pub mod id;
pub mod market;
pub mod money;
pub mod outcome;
pub mod pool;
pub mod position;

pub use balance::Balance;
pub use error::{ErrorKind, ExchangeError};
pub use id::{AccountId, ExchangeId, MarketId, PoolId, PositionId, StrategyId};
pub use market::{Market, MarketParams, MarketStatus};
pub use money::{Amount, Bps, StakeSplit, BPS_DENOMINATOR};
pub use outcome::{Odds, Side};
pub use pool::{quote, swap_output, BetFill, Pool, PoolSnapshot, Redemption};
pub use position::{Position, PositionTerms};
