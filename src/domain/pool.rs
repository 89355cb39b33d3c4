//! Constant-product liquidity pool.
//!
//! The pool prices YES/NO against two reserves `R_y` and `R_n` with
//! `k = R_y * R_n` held at `u128` width. The implied probability of a side is
//! the *opposite* reserve's share of the total.
//!
//! Fees are carved off the gross stake before the swap and never touch the
//! reserves; the full gross stake goes into custody.
//!
//! Mutations are split in two: a pure `plan_*` step that runs every check and
//! computes the post-state, and an `apply_*` step that commits it. A failed
//! plan leaves the pool exactly as it was.

use std::collections::HashMap;

use serde::Serialize;

use super::balance::Balance;
use super::error::ExchangeError;
use super::id::{AccountId, MarketId, PoolId, PositionId};
use super::market::Market;
use super::money::{mul_div, split_stake, Amount, Bps, StakeSplit, BPS_DENOMINATOR};
use super::outcome::{Odds, Side};
use super::position::{Position, PositionTerms};

/// Tokens taken out of `out_reserve` when `in_amount` is added to `in_reserve`.
///
/// `out_reserve - floor(in_reserve * out_reserve / (in_reserve + in_amount))`,
/// computed at double width. Flooring the quotient leaves any rounding
/// residual in the pool.
pub fn swap_output(
    in_reserve: Amount,
    out_reserve: Amount,
    in_amount: Amount,
) -> Result<Amount, ExchangeError> {
    let denominator = u128::from(in_reserve) + u128::from(in_amount);
    if denominator == 0 {
        return Err(ExchangeError::PoolExhausted);
    }
    let remaining = u128::from(in_reserve) * u128::from(out_reserve) / denominator;
    // remaining <= out_reserve because in_reserve <= denominator.
    let out = u128::from(out_reserve) - remaining;
    Amount::try_from(out).map_err(|_| ExchangeError::ArithmeticOverflow)
}

/// Implied odds for the given reserves.
///
/// YES odds are the NO reserve's share of the total; NO takes the complement.
/// Empty reserves quote even odds.
#[must_use]
pub fn quote(yes_reserve: Amount, no_reserve: Amount) -> Odds {
    let total = u128::from(yes_reserve) + u128::from(no_reserve);
    if total == 0 {
        return Odds::EVEN;
    }
    let yes = u128::from(no_reserve) * u128::from(BPS_DENOMINATOR) / total;
    // yes <= BPS_DENOMINATOR, so the narrowing cannot truncate.
    Odds::from_yes(yes as Bps)
}

/// Everything a bet will change, computed without mutating the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetFill {
    pub side: Side,
    /// Gross stake, fees included.
    pub stake: Amount,
    pub split: StakeSplit,
    /// Reserve removed from the opposite side by the swap.
    pub tokens_out: Amount,
    pub odds_before: Odds,
    pub odds_after: Odds,
    /// `stake * 10000 / odds_before[side]`.
    pub potential_payout: Amount,
    yes_reserve_after: Amount,
    no_reserve_after: Amount,
    liability_after: Amount,
}

impl BetFill {
    /// Odds of the bet side the bettor was quoted.
    #[must_use]
    pub const fn quoted_odds(&self) -> Bps {
        self.odds_before.of(self.side)
    }

    /// Absolute drift of the bet side's odds caused by this fill.
    #[must_use]
    pub const fn drift(&self) -> Bps {
        self.odds_before
            .of(self.side)
            .abs_diff(self.odds_after.of(self.side))
    }
}

/// Outcome of redeeming a position, computed without mutating the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redemption {
    pub position_id: PositionId,
    pub win: bool,
    pub payout: Amount,
}

/// Read-only view of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub id: PoolId,
    pub market_id: MarketId,
    pub provider: AccountId,
    pub yes_reserve: Amount,
    pub no_reserve: Amount,
    pub k: u128,
    pub fee_rate_bps: Bps,
    pub fees_collected: Amount,
    pub treasury_fees: Amount,
    pub custodied_balance: Amount,
    pub yes_liability: Amount,
    pub no_liability: Amount,
    pub outstanding_positions: usize,
    pub odds: Odds,
}

/// Constant-product pool bound to one market.
#[derive(Debug)]
pub struct Pool {
    id: PoolId,
    market_id: MarketId,
    provider: AccountId,
    yes_reserve: Amount,
    no_reserve: Amount,
    fee_rate_bps: Bps,
    fees_collected: Amount,
    treasury_fees: Amount,
    k: u128,
    custody: Balance,
    yes_liability: Amount,
    no_liability: Amount,
    outstanding: HashMap<PositionId, PositionTerms>,
}

impl Pool {
    /// Validate pool creation against `market`.
    ///
    /// # Errors
    ///
    /// `MarketNotOpen`, `InsufficientSeed` for a seed that cannot give both
    /// sides a reserve, `InvalidFeeRate` when the pool fee exceeds `max_fee_bps`
    /// or pool and treasury fees together exceed par.
    pub fn check_creation(
        market: &Market,
        seed_amount: Amount,
        fee_rate_bps: Bps,
        max_fee_bps: Bps,
    ) -> Result<(), ExchangeError> {
        market.ensure_open()?;
        if seed_amount < 2 {
            return Err(ExchangeError::InsufficientSeed {
                amount: seed_amount,
            });
        }
        if fee_rate_bps > max_fee_bps {
            return Err(ExchangeError::InvalidFeeRate {
                fee_rate_bps,
                max: max_fee_bps,
            });
        }
        let combined = fee_rate_bps.saturating_add(market.fee_rate_bps());
        if combined > BPS_DENOMINATOR {
            return Err(ExchangeError::InvalidFeeRate {
                fee_rate_bps: combined,
                max: BPS_DENOMINATOR,
            });
        }
        Ok(())
    }

    /// Create a pool, splitting `seed` evenly across both reserves.
    ///
    /// An odd seed puts the extra unit on the NO side. `provider` is the
    /// account that supplied the seed and may later sweep the surplus. Call
    /// [`Pool::check_creation`] first.
    pub fn new(
        id: PoolId,
        market_id: MarketId,
        provider: AccountId,
        seed: Balance,
        fee_rate_bps: Bps,
    ) -> Self {
        let yes_reserve = seed.value() / 2;
        let no_reserve = seed.value() - yes_reserve;
        Self {
            id,
            market_id,
            provider,
            yes_reserve,
            no_reserve,
            fee_rate_bps,
            fees_collected: 0,
            treasury_fees: 0,
            k: u128::from(yes_reserve) * u128::from(no_reserve),
            custody: seed,
            yes_liability: 0,
            no_liability: 0,
            outstanding: HashMap::new(),
        }
    }

    /// Current implied odds.
    #[must_use]
    pub fn odds(&self) -> Odds {
        quote(self.yes_reserve, self.no_reserve)
    }

    /// Run every bet check and compute the resulting state.
    ///
    /// # Errors
    ///
    /// `MarketNotOpen`, `InvalidBetAmount`, `SlippageExceeded`, `PoolExhausted`,
    /// `Insolvent` or `ArithmeticOverflow`.
    pub fn plan_bet(
        &self,
        market: &Market,
        side: Side,
        stake: Amount,
        max_slippage_bps: Bps,
    ) -> Result<BetFill, ExchangeError> {
        market.ensure_open()?;
        market.ensure_bet_size(stake)?;
        market.volume_after(stake)?;

        let odds_before = self.odds();
        let split = split_stake(stake, market.fee_rate_bps(), self.fee_rate_bps)?;

        let (yes_reserve_after, no_reserve_after, tokens_out) = match side {
            Side::Yes => {
                let out = swap_output(self.no_reserve, self.yes_reserve, split.effective)?;
                let yes = self
                    .yes_reserve
                    .checked_add(split.effective)
                    .ok_or(ExchangeError::ArithmeticOverflow)?;
                (yes, drain(self.no_reserve, out)?, out)
            }
            Side::No => {
                let out = swap_output(self.yes_reserve, self.no_reserve, split.effective)?;
                let no = self
                    .no_reserve
                    .checked_add(split.effective)
                    .ok_or(ExchangeError::ArithmeticOverflow)?;
                (drain(self.yes_reserve, out)?, no, out)
            }
        };

        let odds_after = quote(yes_reserve_after, no_reserve_after);
        let drift = odds_before.of(side).abs_diff(odds_after.of(side));
        if drift > max_slippage_bps {
            return Err(ExchangeError::SlippageExceeded {
                drift,
                max: max_slippage_bps,
            });
        }

        self.fees_collected
            .checked_add(split.pool_fee)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        self.treasury_fees
            .checked_add(split.treasury_fee)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        let custody_after = self
            .custody
            .value()
            .checked_add(stake)
            .ok_or(ExchangeError::ArithmeticOverflow)?;

        let quoted = odds_before.of(side);
        if quoted == 0 {
            return Err(ExchangeError::PoolExhausted);
        }
        let potential_payout = mul_div(stake, BPS_DENOMINATOR, quoted)?;

        let liability_after = self
            .liability(side)
            .checked_add(potential_payout)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        let worst_case = liability_after.max(self.liability(side.opposite()));
        if worst_case > custody_after {
            return Err(ExchangeError::Insolvent {
                liability: worst_case,
                custody: custody_after,
            });
        }

        Ok(BetFill {
            side,
            stake,
            split,
            tokens_out,
            odds_before,
            odds_after,
            potential_payout,
            yes_reserve_after,
            no_reserve_after,
            liability_after,
        })
    }

    /// Commit a planned bet: move reserves, refresh `k`, take custody of the
    /// gross stake and register the minted position.
    pub(crate) fn apply_bet(
        &mut self,
        fill: &BetFill,
        position_id: PositionId,
        funds: Balance,
    ) -> Result<(), ExchangeError> {
        debug_assert_eq!(funds.value(), fill.stake);
        self.custody.join(funds)?;
        self.yes_reserve = fill.yes_reserve_after;
        self.no_reserve = fill.no_reserve_after;
        self.k = u128::from(self.yes_reserve) * u128::from(self.no_reserve);
        self.fees_collected += fill.split.pool_fee;
        self.treasury_fees += fill.split.treasury_fee;
        match fill.side {
            Side::Yes => self.yes_liability = fill.liability_after,
            Side::No => self.no_liability = fill.liability_after,
        }
        self.outstanding.insert(
            position_id,
            PositionTerms {
                market_id: self.market_id,
                side: fill.side,
                amount: fill.stake,
                odds_at_purchase: fill.quoted_odds(),
                potential_payout: fill.potential_payout,
            },
        );
        Ok(())
    }

    /// Check a redemption and compute its payout.
    ///
    /// # Errors
    ///
    /// `MarketNotResolved`, `UnknownPosition` for a position this pool does
    /// not owe (or whose terms differ from the ones it minted),
    /// `InsufficientCustody` if custody cannot cover the payout.
    pub fn plan_redeem(
        &self,
        market: &Market,
        position: &Position,
    ) -> Result<Redemption, ExchangeError> {
        let result = market.settled_result()?;
        let minted = match self.outstanding.get(&position.id()) {
            Some(terms) if position.pool_id() == self.id && *terms == position.terms() => terms,
            _ => return Err(ExchangeError::UnknownPosition(position.id())),
        };
        if self.liability(minted.side) < minted.potential_payout {
            return Err(ExchangeError::ArithmeticOverflow);
        }

        let payout = position.payout_for(result);
        if payout > self.custody.value() {
            return Err(ExchangeError::InsufficientCustody {
                required: payout,
                available: self.custody.value(),
            });
        }

        Ok(Redemption {
            position_id: position.id(),
            win: position.side() == result,
            payout,
        })
    }

    /// Take a planned redemption's payout out of custody.
    ///
    /// The position stays outstanding until [`Pool::settle_redeem`]; if the
    /// payout cannot be delivered, hand it back with [`Pool::restore_custody`].
    pub(crate) fn take_payout(&mut self, redemption: &Redemption) -> Result<Balance, ExchangeError> {
        self.custody.split(redemption.payout)
    }

    /// Return undelivered funds to custody.
    pub(crate) fn restore_custody(&mut self, funds: Balance) -> Result<(), ExchangeError> {
        self.custody.join(funds)
    }

    /// Retire a paid position and release its liability.
    pub(crate) fn settle_redeem(&mut self, position_id: PositionId) -> Result<(), ExchangeError> {
        let terms = self
            .outstanding
            .remove(&position_id)
            .ok_or(ExchangeError::UnknownPosition(position_id))?;
        let liability = match terms.side {
            Side::Yes => &mut self.yes_liability,
            Side::No => &mut self.no_liability,
        };
        *liability = liability
            .checked_sub(terms.potential_payout)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Custody in excess of what the winning side's outstanding positions can claim.
    ///
    /// # Errors
    ///
    /// `MarketNotResolved` before resolution.
    pub fn surplus(&self, market: &Market) -> Result<Amount, ExchangeError> {
        let result = market.settled_result()?;
        Ok(self.custody.value().saturating_sub(self.liability(result)))
    }

    /// Withdraw `amount` of surplus from custody.
    pub(crate) fn withdraw_surplus(&mut self, amount: Amount) -> Result<Balance, ExchangeError> {
        self.custody.split(amount)
    }

    /// Outstanding payout obligation if `side` wins.
    #[must_use]
    pub const fn liability(&self, side: Side) -> Amount {
        match side {
            Side::Yes => self.yes_liability,
            Side::No => self.no_liability,
        }
    }

    /// Larger of the two per-side liabilities.
    #[must_use]
    pub fn worst_case_liability(&self) -> Amount {
        self.yes_liability.max(self.no_liability)
    }

    /// True when custody covers the worst-case payout.
    #[must_use]
    pub fn is_solvent(&self) -> bool {
        self.custody.value() >= self.worst_case_liability()
    }

    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    #[must_use]
    pub const fn market_id(&self) -> MarketId {
        self.market_id
    }

    /// Account that seeded the pool.
    #[must_use]
    pub const fn provider(&self) -> &AccountId {
        &self.provider
    }

    #[must_use]
    pub const fn yes_reserve(&self) -> Amount {
        self.yes_reserve
    }

    #[must_use]
    pub const fn no_reserve(&self) -> Amount {
        self.no_reserve
    }

    #[must_use]
    pub const fn k(&self) -> u128 {
        self.k
    }

    #[must_use]
    pub const fn fee_rate_bps(&self) -> Bps {
        self.fee_rate_bps
    }

    #[must_use]
    pub const fn fees_collected(&self) -> Amount {
        self.fees_collected
    }

    #[must_use]
    pub const fn treasury_fees(&self) -> Amount {
        self.treasury_fees
    }

    #[must_use]
    pub const fn custodied_balance(&self) -> Amount {
        self.custody.value()
    }

    #[must_use]
    pub fn outstanding_positions(&self) -> usize {
        self.outstanding.len()
    }

    #[must_use]
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            id: self.id,
            market_id: self.market_id,
            provider: self.provider.clone(),
            yes_reserve: self.yes_reserve,
            no_reserve: self.no_reserve,
            k: self.k,
            fee_rate_bps: self.fee_rate_bps,
            fees_collected: self.fees_collected,
            treasury_fees: self.treasury_fees,
            custodied_balance: self.custody.value(),
            yes_liability: self.yes_liability,
            no_liability: self.no_liability,
            outstanding_positions: self.outstanding.len(),
            odds: self.odds(),
        }
    }
}

/// Subtract swap output from a reserve, which must stay positive.
fn drain(reserve: Amount, out: Amount) -> Result<Amount, ExchangeError> {
    match reserve.checked_sub(out) {
        Some(left) if left > 0 => Ok(left),
        _ => Err(ExchangeError::PoolExhausted),
    }
}
