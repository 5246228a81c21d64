//! Pricer output records.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use super::Side;

/// Decimal places printed for a quoted price.
pub const PRICE_DECIMALS: u32 = 2;

/// A reported change in what a target-size market order would cost.
///
/// `side` is the side of the hypothetical order (`S` for selling into the
/// bids, `B` for buying from the asks). `price` is `None` when the target
/// can no longer be filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub timestamp: u64,
    pub side: Side,
    pub price: Option<Decimal>,
}

impl Quote {
    pub fn priced(timestamp: u64, side: Side, price: Decimal) -> Self {
        Self {
            timestamp,
            side,
            price: Some(price),
        }
    }

    pub fn unavailable(timestamp: u64, side: Side) -> Self {
        Self {
            timestamp,
            side,
            price: None,
        }
    }
}

/// Formats as `<timestamp> <side> <price|NA>`, rounding half away from zero.
impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.price {
            Some(price) => {
                let rounded = price
                    .round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
                write!(
                    f,
                    "{} {} {:.prec$}",
                    self.timestamp,
                    self.side,
                    rounded,
                    prec = PRICE_DECIMALS as usize
                )
            }
            None => write!(f, "{} {} NA", self.timestamp, self.side),
        }
    }
}
