//! Binary outcome and implied-probability types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::{Bps, BPS_DENOMINATOR};

/// One side of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }

    /// True for [`Side::Yes`].
    #[must_use]
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<bool> for Side {
    fn from(yes: bool) -> Self {
        if yes {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

/// Implied probabilities of both sides, in basis points.
///
/// The two values always sum to [`BPS_DENOMINATOR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Odds {
    yes: Bps,
    no: Bps,
}

impl Odds {
    /// Even odds, returned for an empty pool.
    pub const EVEN: Self = Self {
        yes: BPS_DENOMINATOR / 2,
        no: BPS_DENOMINATOR / 2,
    };

    /// Build odds from the YES probability; NO takes the complement.
    ///
    /// Values above par are clamped.
    #[must_use]
    pub const fn from_yes(yes: Bps) -> Self {
        let yes = if yes > BPS_DENOMINATOR {
            BPS_DENOMINATOR
        } else {
            yes
        };
        Self {
            yes,
            no: BPS_DENOMINATOR - yes,
        }
    }

    /// YES probability in basis points.
    #[must_use]
    pub const fn yes(&self) -> Bps {
        self.yes
    }

    /// NO probability in basis points.
    #[must_use]
    pub const fn no(&self) -> Bps {
        self.no
    }

    /// Probability of `side` in basis points.
    #[must_use]
    pub const fn of(&self, side: Side) -> Bps {
        match side {
            Side::Yes => self.yes,
            Side::No => self.no,
        }
    }

    /// Probability of `side` as a fraction in `[0, 1]`.
    #[must_use]
    pub fn probability(&self, side: Side) -> Decimal {
        Decimal::new(self.of(side) as i64, 4)
    }
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "YES {} / NO {}", self.yes, self.no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn side_from_bool() {
        assert_eq!(Side::from(true), Side::Yes);
        assert_eq!(Side::from(false), Side::No);
    }

    #[test]
    fn side_opposite_round_trips() {
        assert_eq!(Side::Yes.opposite(), Side::No);
        assert_eq!(Side::No.opposite().opposite(), Side::No);
    }

    #[test]
    fn odds_from_yes_sums_to_par() {
        let odds = Odds::from_yes(6_666);
        assert_eq!(odds.yes() + odds.no(), BPS_DENOMINATOR);
        assert_eq!(odds.of(Side::No), 3_334);
    }

    #[test]
    fn odds_from_yes_clamps() {
        assert_eq!(Odds::from_yes(12_000).yes(), BPS_DENOMINATOR);
    }

    #[test]
    fn odds_probability_is_fractional() {
        let odds = Odds::from_yes(4_098);
        assert_eq!(odds.probability(Side::Yes), dec!(0.4098));
        assert_eq!(odds.probability(Side::No), dec!(0.5902));
    }

    #[test]
    fn even_odds() {
        assert_eq!(Odds::EVEN.yes(), 5_000);
        assert_eq!(Odds::EVEN.no(), 5_000);
    }
}
