//! Fixed-point amount arithmetic.
//!
//! Amounts are unsigned integers in the custodied asset's smallest unit.
//! Rates and odds are basis points (10000 = 100%). Every multiply is widened
//! to `u128` and every divide truncates toward zero.

use super::error::ExchangeError;

/// Asset amount in base units.
pub type Amount = u64;

/// Basis points, 0..=10000 for rates and odds.
pub type Bps = u64;

/// One hundred percent in basis points.
pub const BPS_DENOMINATOR: Bps = 10_000;

/// Compute `a * b / c` at double width, truncating toward zero.
///
/// Returns `ArithmeticOverflow` when `c` is zero or the quotient does not
/// fit back into an [`Amount`].
pub fn mul_div(a: Amount, b: Amount, c: Amount) -> Result<Amount, ExchangeError> {
    if c == 0 {
        return Err(ExchangeError::ArithmeticOverflow);
    }
    let wide = u128::from(a) * u128::from(b) / u128::from(c);
    Amount::try_from(wide).map_err(|_| ExchangeError::ArithmeticOverflow)
}

/// Take `bps` basis points of `amount`, truncating toward zero.
///
/// Never overflows for `bps <= BPS_DENOMINATOR` since the result is at most `amount`.
pub fn bps_of(amount: Amount, bps: Bps) -> Result<Amount, ExchangeError> {
    mul_div(amount, bps, BPS_DENOMINATOR)
}

/// A gross stake broken into its fee components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeSplit {
    /// Share routed to the market treasury.
    pub treasury_fee: Amount,
    /// Share kept by the pool as trading fee.
    pub pool_fee: Amount,
    /// What actually enters the swap.
    pub effective: Amount,
}

/// Split a gross stake into treasury fee, pool fee and effective stake.
///
/// Both fees are taken off the gross stake independently (not compounded).
pub fn split_stake(
    stake: Amount,
    treasury_fee_bps: Bps,
    pool_fee_bps: Bps,
) -> Result<StakeSplit, ExchangeError> {
    let treasury_fee = bps_of(stake, treasury_fee_bps)?;
    let pool_fee = bps_of(stake, pool_fee_bps)?;
    let effective = stake
        .checked_sub(treasury_fee)
        .and_then(|rest| rest.checked_sub(pool_fee))
        .ok_or(ExchangeError::InvalidFeeRate {
            fee_rate_bps: treasury_fee_bps.saturating_add(pool_fee_bps),
            max: BPS_DENOMINATOR,
        })?;

    Ok(StakeSplit {
        treasury_fee,
        pool_fee,
        effective,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_truncates_toward_zero() {
        assert_eq!(mul_div(10, 10, 3).unwrap(), 33);
        assert_eq!(mul_div(1, 1, 2).unwrap(), 0);
    }

    #[test]
    fn mul_div_widens_intermediate_product() {
        // u64::MAX * 4 overflows u64 but the quotient fits.
        assert_eq!(mul_div(u64::MAX, 4, 8).unwrap(), u64::MAX / 2);
    }

    #[test]
    fn mul_div_rejects_zero_divisor() {
        assert!(matches!(
            mul_div(1, 1, 0),
            Err(ExchangeError::ArithmeticOverflow)
        ));
    }

    #[test]
    fn mul_div_rejects_oversized_quotient() {
        assert!(matches!(
            mul_div(u64::MAX, 2, 1),
            Err(ExchangeError::ArithmeticOverflow)
        ));
    }

    #[test]
    fn bps_of_full_rate_is_identity() {
        assert_eq!(bps_of(12_345, BPS_DENOMINATOR).unwrap(), 12_345);
        assert_eq!(bps_of(12_345, 0).unwrap(), 0);
    }

    #[test]
    fn split_stake_fees_are_independent() {
        // 1.5% treasury + 0.5% pool on 999 -> 14 + 4, not compounded.
        let split = split_stake(999, 150, 50).unwrap();
        assert_eq!(split.treasury_fee, 14);
        assert_eq!(split.pool_fee, 4);
        assert_eq!(split.effective, 981);
    }

    #[test]
    fn split_stake_zero_fees_passes_through() {
        let split = split_stake(100_000, 0, 0).unwrap();
        assert_eq!(split.effective, 100_000);
        assert_eq!(split.treasury_fee + split.pool_fee, 0);
    }

    #[test]
    fn split_stake_rejects_fees_above_par() {
        assert!(matches!(
            split_stake(100, 6_000, 6_000),
            Err(ExchangeError::InvalidFeeRate { .. })
        ));
    }
}
