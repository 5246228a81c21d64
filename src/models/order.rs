//! Resting order model.

use rust_decimal::Decimal;

use super::Side;

/// A live limit order resting in the book.
///
/// `filled` is the part of `size` that was counted toward the most recent
/// successful price computation on this order's side. The registry keeps
/// `filled <= size <= original_size` at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub side: Side,
    pub price: Decimal,
    pub original_size: u64,
    pub size: u64,
    pub filled: u64,
    /// Insertion sequence, assigned by the registry. Breaks price/size ties.
    pub sequence: u64,
}

impl Order {
    /// Creates a fresh order with nothing filled.
    ///
    /// The sequence number is left at zero until the order is registered.
    pub fn new(id: impl Into<String>, side: Side, price: Decimal, size: u64) -> Self {
        Self {
            id: id.into(),
            side,
            price,
            original_size: size,
            size,
            filled: 0,
            sequence: 0,
        }
    }

    /// Returns `true` if a reduction to `new_size` would eat into quantity
    /// already counted in the last reported price.
    pub fn encroaches_fill(&self, new_size: u64) -> bool {
        self.filled > 0 && new_size < self.filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_order_is_unfilled() {
        let order = Order::new("b1", Side::Buy, dec!(10.00), 100);
        assert_eq!(order.size, 100);
        assert_eq!(order.original_size, 100);
        assert_eq!(order.filled, 0);
    }

    #[test]
    fn encroachment_needs_a_fill() {
        let mut order = Order::new("b1", Side::Buy, dec!(10.00), 100);
        assert!(!order.encroaches_fill(0));

        order.filled = 60;
        assert!(!order.encroaches_fill(60));
        assert!(!order.encroaches_fill(80));
        assert!(order.encroaches_fill(59));
        assert!(order.encroaches_fill(0));
    }
}
