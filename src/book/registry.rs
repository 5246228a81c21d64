//! Canonical store of live order state.
//!
//! Side books only hold order ids; the price, sizes and fill marks of every
//! order live here.

use std::collections::HashMap;

use crate::Result;
use crate::error::PricerError;
use crate::models::Order;

/// Live orders keyed by order id.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: HashMap<String, Order>,
    next_sequence: u64,
}

impl OrderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new order and stamps it with the next insertion sequence.
    ///
    /// # Errors
    ///
    /// Returns [`PricerError::DuplicateOrderId`] if an order with the same
    /// id is still live. The registry is left untouched in that case.
    pub fn register(&mut self, mut order: Order) -> Result<&Order> {
        if self.orders.contains_key(&order.id) {
            return Err(PricerError::DuplicateOrderId(order.id));
        }

        order.sequence = self.next_sequence;
        self.next_sequence += 1;

        let id = order.id.clone();
        Ok(self.orders.entry(id).or_insert(order))
    }

    /// # Errors
    ///
    /// Returns [`PricerError::UnknownOrderId`] if no such order is live.
    pub fn get(&self, order_id: &str) -> Result<&Order> {
        self.orders
            .get(order_id)
            .ok_or_else(|| PricerError::UnknownOrderId(order_id.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`PricerError::UnknownOrderId`] if no such order is live.
    pub fn get_mut(&mut self, order_id: &str) -> Result<&mut Order> {
        self.orders
            .get_mut(order_id)
            .ok_or_else(|| PricerError::UnknownOrderId(order_id.to_string()))
    }

    /// Shrinks an order by `amount`, flooring at zero.
    ///
    /// The fill mark is clamped to the new size so the order never claims
    /// more filled quantity than it holds.
    ///
    /// # Errors
    ///
    /// Returns [`PricerError::UnknownOrderId`] if no such order is live.
    /// Callers treat this as a no-op.
    pub fn reduce(&mut self, order_id: &str, amount: u64) -> Result<&Order> {
        let order = self.get_mut(order_id)?;
        order.size = order.size.saturating_sub(amount);
        order.filled = order.filled.min(order.size);
        Ok(order)
    }

    /// Drops an order from the registry, returning its final state.
    pub fn remove(&mut self, order_id: &str) -> Option<Order> {
        self.orders.remove(order_id)
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.orders.contains_key(order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }
}
