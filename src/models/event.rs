//! Order book feed events.
//!
//! A feed is a sequence of [`Event`]s in non-decreasing timestamp order.
//! Only two kinds exist: a new resting order and a size reduction of an
//! existing one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;

/// A single order book event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Add(AddOrder),
    Reduce(ReduceOrder),
}

/// A new limit order joining the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOrder {
    pub timestamp: u64,
    pub order_id: String,
    pub side: Side,
    pub price: Decimal,
    pub size: u64,
}

/// A reduction of a live order's size by `size` units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReduceOrder {
    pub timestamp: u64,
    pub order_id: String,
    pub size: u64,
}

impl Event {
    pub fn timestamp(&self) -> u64 {
        match self {
            Event::Add(add) => add.timestamp,
            Event::Reduce(reduce) => reduce.timestamp,
        }
    }

    pub fn order_id(&self) -> &str {
        match self {
            Event::Add(add) => &add.order_id,
            Event::Reduce(reduce) => &reduce.order_id,
        }
    }
}
