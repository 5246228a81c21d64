//! Shared models for the order book feed.
//!
//! Contains the [`Side`] of an order, the resting [`Order`] itself, the
//! events a feed produces and the quotes the pricer emits.

pub mod event;
pub mod order;
pub mod quote;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use event::{AddOrder, Event, ReduceOrder};
pub use order::Order;
pub use quote::Quote;

/// Order side (buy or sell).
///
/// On the wire both feed and output use the single-letter tags `B` and `S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "B")]
    Buy,
    #[serde(rename = "S")]
    Sell,
}

impl Side {
    /// Returns the wire-format tag for this side.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "B",
            Side::Sell => "S",
        }
    }

    /// Returns the other side of the book.
    ///
    /// A quote computed from resting buy orders prices a hypothetical sell,
    /// and vice versa.
    #[must_use]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => Ok(Side::Buy),
            "S" => Ok(Side::Sell),
            other => Err(format!("unknown side {other:?}")),
        }
    }
}
