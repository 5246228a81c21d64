//! Order book state and the pricing state machine.
//!
//! [`BookController`] owns the [`OrderRegistry`] and one [`SideBook`] per
//! side. It applies feed events one at a time and decides when the price of
//! a target-size market order has changed enough to be reported.

pub mod execution;
pub mod registry;
pub mod side;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::Result;
use crate::error::PricerError;
use crate::models::{AddOrder, Event, Order, Quote, ReduceOrder, Side};

use execution::{Execution, clear_fills, price_for_target};
use registry::OrderRegistry;
use side::{Asks, Bids, Direction, SideBook};

/// Last reported availability, keyed by the side tag of the quote.
#[derive(Debug, Default, Clone, Copy)]
struct Availability {
    buy: bool,
    sell: bool,
}

impl Availability {
    fn get(&self, tag: Side) -> bool {
        match tag {
            Side::Buy => self.buy,
            Side::Sell => self.sell,
        }
    }

    fn set(&mut self, tag: Side, available: bool) {
        match tag {
            Side::Buy => self.buy = available,
            Side::Sell => self.sell = available,
        }
    }
}

/// Applies feed events and reports target-size prices for one instrument.
#[derive(Debug)]
pub struct BookController {
    target_size: u64,
    registry: OrderRegistry,
    bids: SideBook<Bids>,
    asks: SideBook<Asks>,
    available: Availability,
}

impl BookController {
    /// Creates an empty book that prices market orders of `target_size`.
    ///
    /// # Errors
    ///
    /// Returns [`PricerError::InvalidConfiguration`] if `target_size` is 0.
    pub fn new(target_size: u64) -> Result<Self> {
        if target_size == 0 {
            return Err(PricerError::InvalidConfiguration(
                "target size must be positive".to_string(),
            ));
        }

        Ok(Self {
            target_size,
            registry: OrderRegistry::new(),
            bids: SideBook::new(),
            asks: SideBook::new(),
            available: Availability::default(),
        })
    }

    /// Applies one event and returns the quote it produced, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PricerError::DuplicateOrderId`] when an Add reuses a live
    /// id, and [`PricerError::ArithmeticOverflow`] when an event would push
    /// a resting total or a notional out of range. Either way the caller may
    /// carry on with the next event. Reductions of unknown orders are logged
    /// and ignored.
    pub fn apply(&mut self, event: &Event) -> Result<Option<Quote>> {
        match event {
            Event::Add(add) => self.add(add),
            Event::Reduce(reduce) => self.reduce(reduce),
        }
    }

    /// Rests a new order and re-prices its side if it now holds enough size.
    ///
    /// # Errors
    ///
    /// Returns [`PricerError::DuplicateOrderId`] if the id is already live,
    /// or [`PricerError::ArithmeticOverflow`] if resting or pricing the order
    /// overflows. The order is not kept in either case.
    pub fn add(&mut self, add: &AddOrder) -> Result<Option<Quote>> {
        let order = self.registry.register(Order::new(
            add.order_id.as_str(),
            add.side,
            add.price,
            add.size,
        ))?;
        debug!(
            order_id = %add.order_id,
            side = ?add.side,
            price = %add.price,
            size = add.size,
            "Added order"
        );

        let priced = match add.side {
            Side::Buy => self.bids.insert(order).and_then(|()| {
                price_on_add(&mut self.bids, &mut self.registry, self.target_size)
            }),
            Side::Sell => self.asks.insert(order).and_then(|()| {
                price_on_add(&mut self.asks, &mut self.registry, self.target_size)
            }),
        };
        if priced.is_err() {
            match add.side {
                Side::Buy => self.bids.remove(&add.order_id),
                Side::Sell => self.asks.remove(&add.order_id),
            };
            self.registry.remove(&add.order_id);
        }

        let tag = add.side.opposite();
        Ok(priced?.map(|price| {
            self.available.set(tag, true);
            let quote = Quote::priced(add.timestamp, tag, price);
            info!(%quote, "Target priced");
            quote
        }))
    }

    /// Shrinks a resting order, re-pricing its side only when the reduction
    /// eats into quantity that the last reported price relied on.
    ///
    /// # Errors
    ///
    /// Returns [`PricerError::ArithmeticOverflow`] if the re-price overflows.
    /// The reduction itself stays applied and the last report stands.
    pub fn reduce(&mut self, reduce: &ReduceOrder) -> Result<Option<Quote>> {
        let (side, new_size, encroaches) = match self.registry.get(&reduce.order_id) {
            Ok(order) => {
                let new_size = order.size.saturating_sub(reduce.size);
                (order.side, new_size, order.encroaches_fill(new_size))
            }
            Err(err) => {
                warn!(%err, timestamp = reduce.timestamp, "Ignoring reduce");
                return Ok(None);
            }
        };

        // Registry and book change together; nothing fallible sits between.
        if let Err(err) = self.registry.reduce(&reduce.order_id, reduce.size) {
            warn!(%err, timestamp = reduce.timestamp, "Ignoring reduce");
            return Ok(None);
        }
        match side {
            Side::Buy => self.bids.reinsert_after_size_change(&reduce.order_id, new_size),
            Side::Sell => self.asks.reinsert_after_size_change(&reduce.order_id, new_size),
        };
        if new_size == 0 {
            self.registry.remove(&reduce.order_id);
        }
        debug!(
            order_id = %reduce.order_id,
            size = new_size,
            encroaches,
            "Reduced order"
        );

        if !encroaches {
            return Ok(None);
        }

        let execution = match side {
            Side::Buy => reprice(&mut self.bids, &mut self.registry, self.target_size),
            Side::Sell => reprice(&mut self.asks, &mut self.registry, self.target_size),
        }?;

        let tag = side.opposite();
        let quote = match execution {
            Execution::Priced(price) => {
                self.available.set(tag, true);
                Quote::priced(reduce.timestamp, tag, price)
            }
            Execution::Unavailable => {
                if !self.available.get(tag) {
                    debug!(side = ?tag, "Target still unavailable");
                    return Ok(None);
                }
                self.available.set(tag, false);
                Quote::unavailable(reduce.timestamp, tag)
            }
        };

        info!(%quote, "Target re-priced after reduce");
        Ok(Some(quote))
    }

    pub fn target_size(&self) -> u64 {
        self.target_size
    }

    pub fn registry(&self) -> &OrderRegistry {
        &self.registry
    }

    pub fn bids(&self) -> &SideBook<Bids> {
        &self.bids
    }

    pub fn asks(&self) -> &SideBook<Asks> {
        &self.asks
    }

    /// Whether the last report for quotes tagged `tag` carried a price.
    pub fn is_available(&self, tag: Side) -> bool {
        self.available.get(tag)
    }
}

/// Prices `book` after an add, skipping the walk when its total is short.
fn price_on_add<D: Direction>(
    book: &mut SideBook<D>,
    registry: &mut OrderRegistry,
    target: u64,
) -> Result<Option<Decimal>> {
    if book.total_resting_size() < target {
        return Ok(None);
    }
    Ok(match price_for_target(book, registry, target)? {
        Execution::Priced(price) => Some(price),
        Execution::Unavailable => None,
    })
}

/// Re-prices `book` after a reduction invalidated its last price.
fn reprice<D: Direction>(
    book: &mut SideBook<D>,
    registry: &mut OrderRegistry,
    target: u64,
) -> Result<Execution> {
    if book.total_resting_size() < target {
        clear_fills(book, registry);
        return Ok(Execution::Unavailable);
    }
    price_for_target(book, registry, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn add(ts: u64, id: &str, side: Side, price: Decimal, size: u64) -> Event {
        Event::Add(AddOrder {
            timestamp: ts,
            order_id: id.to_string(),
            side,
            price,
            size,
        })
    }

    fn reduce(ts: u64, id: &str, size: u64) -> Event {
        Event::Reduce(ReduceOrder {
            timestamp: ts,
            order_id: id.to_string(),
            size,
        })
    }

    #[test]
    fn rejects_zero_target() {
        assert!(matches!(
            BookController::new(0),
            Err(PricerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn prices_sell_once_bids_cover_target() {
        let mut book = BookController::new(200).unwrap();

        let quote = book.apply(&add(1, "B1", Side::Buy, dec!(10.00), 100)).unwrap();
        assert_eq!(quote, None);

        let quote = book.apply(&add(2, "B2", Side::Buy, dec!(9.50), 150)).unwrap();
        assert_eq!(quote, Some(Quote::priced(2, Side::Sell, dec!(9.75))));
        assert!(book.is_available(Side::Sell));
        assert!(!book.is_available(Side::Buy));
    }

    #[test]
    fn encroaching_reduce_reports_na() {
        let mut book = BookController::new(200).unwrap();
        book.apply(&add(1, "B1", Side::Buy, dec!(10.00), 100)).unwrap();
        book.apply(&add(2, "B2", Side::Buy, dec!(9.50), 150)).unwrap();

        let quote = book.apply(&reduce(3, "B2", 130)).unwrap();
        assert_eq!(quote, Some(Quote::unavailable(3, Side::Sell)));
        assert_eq!(book.bids().total_resting_size(), 120);
        assert!(!book.is_available(Side::Sell));
    }

    #[test]
    fn reduce_of_unused_order_is_silent() {
        let mut book = BookController::new(200).unwrap();
        book.apply(&add(1, "A1", Side::Sell, dec!(44.26), 100)).unwrap();

        assert_eq!(book.apply(&reduce(2, "A1", 40)).unwrap(), None);
        assert_eq!(book.registry().get("A1").unwrap().size, 60);
        assert_eq!(book.asks().total_resting_size(), 60);
    }

    #[test]
    fn reduce_within_unused_remainder_is_silent() {
        let mut book = BookController::new(100).unwrap();
        book.apply(&add(1, "A1", Side::Sell, dec!(44.26), 300)).unwrap();

        assert_eq!(book.apply(&reduce(2, "A1", 150)).unwrap(), None);
        assert!(book.is_available(Side::Buy));
    }

    #[test]
    fn encroaching_reduce_with_depth_reprices() {
        let mut book = BookController::new(100).unwrap();
        book.apply(&add(1, "A1", Side::Sell, dec!(44.00), 100)).unwrap();
        book.apply(&add(2, "A2", Side::Sell, dec!(45.00), 100)).unwrap();

        let quote = book.apply(&reduce(3, "A1", 50)).unwrap();
        assert_eq!(quote, Some(Quote::priced(3, Side::Buy, dec!(44.50))));
    }

    #[test]
    fn unknown_reduce_is_ignored() {
        let mut book = BookController::new(10).unwrap();
        assert_eq!(book.apply(&reduce(1, "ghost", 5)).unwrap(), None);
    }

    #[test]
    fn fully_reduced_order_is_forgotten() {
        let mut book = BookController::new(10).unwrap();
        book.apply(&add(1, "A1", Side::Sell, dec!(1), 5)).unwrap();
        book.apply(&reduce(2, "A1", 5)).unwrap();

        assert!(!book.registry().contains("A1"));
        assert!(book.asks().is_empty());
        assert_eq!(book.apply(&reduce(3, "A1", 1)).unwrap(), None);
    }

    #[test]
    fn duplicate_add_leaves_book_intact() {
        let mut book = BookController::new(10).unwrap();
        book.apply(&add(1, "X", Side::Buy, dec!(5), 4)).unwrap();

        let err = book.apply(&add(2, "X", Side::Sell, dec!(6), 40)).unwrap_err();
        assert!(matches!(err, PricerError::DuplicateOrderId(_)));
        assert_eq!(book.bids().total_resting_size(), 4);
        assert!(book.asks().is_empty());
    }

    #[test]
    fn add_overflowing_resting_total_is_rejected() {
        let mut book = BookController::new(10).unwrap();
        let half = u64::MAX / 2 + 1;
        book.apply(&add(1, "B1", Side::Buy, dec!(1), half)).unwrap();

        let err = book.apply(&add(2, "B2", Side::Buy, dec!(1), half)).unwrap_err();
        assert!(matches!(err, PricerError::ArithmeticOverflow(_)));
        assert!(!book.registry().contains("B2"));
        assert_eq!(book.bids().len(), 1);
        assert_eq!(book.bids().total_resting_size(), half);
        assert_eq!(book.bids().reconciled_size(), half);

        // The id was never accepted, so it can be used again.
        assert!(book.apply(&add(3, "B2", Side::Buy, dec!(1), 5)).is_ok());
    }

    #[test]
    fn add_overflowing_notional_is_rejected() {
        let mut book = BookController::new(10_000_000_000).unwrap();

        let err = book
            .apply(&add(1, "a", Side::Sell, dec!(100000000000000000000), 10_000_000_000))
            .unwrap_err();
        assert!(matches!(err, PricerError::ArithmeticOverflow(_)));
        assert!(book.registry().is_empty());
        assert!(book.asks().is_empty());
        assert_eq!(book.asks().total_resting_size(), 0);
        assert!(!book.is_available(Side::Buy));

        let quote = book
            .apply(&add(2, "b", Side::Sell, dec!(1), 10_000_000_000))
            .unwrap();
        assert_eq!(quote, Some(Quote::priced(2, Side::Buy, dec!(1))));
    }

    #[test]
    fn reprice_overflow_keeps_reduction_and_last_report() {
        let mut book = BookController::new(100).unwrap();
        book.apply(&add(1, "A1", Side::Sell, dec!(1), 100)).unwrap();
        book.apply(&add(2, "A2", Side::Sell, dec!(10000000000000000000000000000), 100))
            .unwrap();

        let err = book.apply(&reduce(3, "A1", 50)).unwrap_err();
        assert!(matches!(err, PricerError::ArithmeticOverflow(_)));
        assert_eq!(book.registry().get("A1").unwrap().size, 50);
        assert_eq!(book.asks().total_resting_size(), 150);
        assert!(book.is_available(Side::Buy));
    }
}
