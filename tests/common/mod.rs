//! Shared test utilities.

#![allow(dead_code)]

use book_pricer::BookController;
use book_pricer::models::{AddOrder, Event, Quote, ReduceOrder, Side};
use rust_decimal::Decimal;

pub fn add(timestamp: u64, order_id: &str, side: Side, price: Decimal, size: u64) -> Event {
    Event::Add(AddOrder {
        timestamp,
        order_id: order_id.to_string(),
        side,
        price,
        size,
    })
}

pub fn reduce(timestamp: u64, order_id: &str, size: u64) -> Event {
    Event::Reduce(ReduceOrder {
        timestamp,
        order_id: order_id.to_string(),
        size,
    })
}

/// Applies every event to a fresh book and collects the emitted quotes.
/// Duplicate ids are skipped the way the feed driver skips them.
pub fn replay(target: u64, events: &[Event]) -> Vec<Quote> {
    let mut book = BookController::new(target).expect("valid target");
    events
        .iter()
        .filter_map(|event| book.apply(event).ok().flatten())
        .collect()
}

/// Panics if the book's totals or any order's sizes are inconsistent.
pub fn assert_invariants(book: &BookController) {
    assert_eq!(
        book.bids().total_resting_size(),
        book.bids().reconciled_size(),
        "bid total drifted"
    );
    assert_eq!(
        book.asks().total_resting_size(),
        book.asks().reconciled_size(),
        "ask total drifted"
    );

    let registry_total = |side: Side| -> u64 {
        book.registry()
            .iter()
            .filter(|order| order.side == side)
            .map(|order| order.size)
            .sum()
    };
    assert_eq!(book.bids().total_resting_size(), registry_total(Side::Buy));
    assert_eq!(book.asks().total_resting_size(), registry_total(Side::Sell));

    for order in book.registry().iter() {
        assert!(
            order.filled <= order.size && order.size <= order.original_size,
            "order {} has filled={} size={} original={}",
            order.id,
            order.filled,
            order.size,
            order.original_size
        );
        assert!(order.size > 0, "order {} lingers at zero size", order.id);
        let resting = match order.side {
            Side::Buy => book.bids().contains(&order.id),
            Side::Sell => book.asks().contains(&order.id),
        };
        assert!(resting, "order {} missing from its book", order.id);
    }
    assert_eq!(
        book.registry().len(),
        book.bids().len() + book.asks().len()
    );
}
