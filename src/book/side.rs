//! One side of the order book.
//!
//! [`SideBook`] is generic over a [`Direction`] so bids and asks share all
//! of their mutation logic and differ only in how prices rank. Orders are
//! ranked by price (best first), then by remaining size (largest first),
//! then by insertion sequence, which makes every key unique even when two
//! orders share a price and a size.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

use rust_decimal::Decimal;

use crate::Result;
use crate::error::PricerError;
use crate::models::{Order, Side};

/// Price ranking for one side of the book.
pub trait Direction {
    /// Key whose ascending order is best-price-first for this side.
    type PriceKey: Ord + Copy + fmt::Debug;

    /// The side whose orders this book holds.
    const SIDE: Side;

    fn price_key(price: Decimal) -> Self::PriceKey;
}

/// Resting buy orders, highest price first.
#[derive(Debug)]
pub enum Bids {}

/// Resting sell orders, lowest price first.
#[derive(Debug)]
pub enum Asks {}

impl Direction for Bids {
    type PriceKey = Reverse<Decimal>;
    const SIDE: Side = Side::Buy;

    fn price_key(price: Decimal) -> Self::PriceKey {
        Reverse(price)
    }
}

impl Direction for Asks {
    type PriceKey = Decimal;
    const SIDE: Side = Side::Sell;

    fn price_key(price: Decimal) -> Self::PriceKey {
        price
    }
}

/// Position of an order within a side book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct BookKey<P> {
    price: P,
    size: Reverse<u64>,
    sequence: u64,
}

impl<P> BookKey<P> {
    fn size(&self) -> u64 {
        self.size.0
    }
}

/// A price-ordered collection of order ids for one side.
///
/// The book never owns order state; it holds ids into the
/// [`OrderRegistry`](super::registry::OrderRegistry) along with the size it
/// last saw for each, which is what the resting total is built from.
pub struct SideBook<D: Direction> {
    entries: BTreeMap<BookKey<D::PriceKey>, String>,
    keys: HashMap<String, BookKey<D::PriceKey>>,
    total: u64,
    contributors: Vec<String>,
    _direction: PhantomData<D>,
}

impl<D: Direction> SideBook<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            keys: HashMap::new(),
            total: 0,
            contributors: Vec::new(),
            _direction: PhantomData,
        }
    }

    /// Adds an order at its ranked position.
    ///
    /// Orders with no remaining size are not resting and are skipped. An
    /// id that is already present is repositioned rather than duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`PricerError::ArithmeticOverflow`] if the resting total
    /// could not hold the order's size. The book is left unchanged.
    pub fn insert(&mut self, order: &Order) -> Result<()> {
        debug_assert_eq!(order.side, D::SIDE, "order placed on the wrong side");

        let replaced = self.keys.get(&order.id).map_or(0, BookKey::size);
        let total = (self.total - replaced)
            .checked_add(order.size)
            .ok_or_else(|| {
                PricerError::ArithmeticOverflow(format!(
                    "{:?} book cannot hold {} more for order {}",
                    D::SIDE,
                    order.size,
                    order.id
                ))
            })?;

        self.remove(&order.id);
        if order.size > 0 {
            let key = BookKey {
                price: D::price_key(order.price),
                size: Reverse(order.size),
                sequence: order.sequence,
            };
            self.entries.insert(key, order.id.clone());
            self.keys.insert(order.id.clone(), key);
        }
        self.total = total;
        Ok(())
    }

    /// Removes an order if present. Returns whether anything was removed.
    pub fn remove(&mut self, order_id: &str) -> bool {
        match self.keys.remove(order_id) {
            Some(key) => {
                self.entries.remove(&key);
                self.total -= key.size();
                true
            }
            None => false,
        }
    }

    /// Moves an order to the position matching its reduced size.
    ///
    /// Size is part of the ranking, so the entry is taken out and put back
    /// within this one call; the resting total is never observable in a
    /// half-updated state. A new size of zero removes the order. Sizes only
    /// shrink here, so a larger `new_size` is refused.
    pub fn reinsert_after_size_change(&mut self, order_id: &str, new_size: u64) -> bool {
        let Some(mut key) = self.keys.get(order_id).copied() else {
            return false;
        };
        if new_size > key.size() {
            return false;
        }

        let removed = self.entries.remove(&key);
        debug_assert!(removed.is_some(), "book entry missing for {order_id}");
        self.keys.remove(order_id);
        self.total -= key.size();

        if new_size > 0 {
            key.size = Reverse(new_size);
            self.entries.insert(key, order_id.to_string());
            self.keys.insert(order_id.to_string(), key);
            self.total += new_size;
        }
        true
    }

    /// Sum of the sizes of all resting orders, maintained on every mutation.
    pub fn total_resting_size(&self) -> u64 {
        self.total
    }

    /// Recomputes the resting total by walking every entry.
    pub fn reconciled_size(&self) -> u64 {
        self.entries.keys().map(BookKey::size).sum()
    }

    /// Order ids from the best price outward.
    ///
    /// The iterator borrows the book, so it can be dropped and requested
    /// again at any time to restart from the top.
    pub fn iter_best_first(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.values().map(String::as_str)
    }

    /// The id of the best-ranked order, if any.
    pub fn best(&self) -> Option<&str> {
        self.iter_best_first().next()
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.keys.contains_key(order_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hands over the ids whose fill marks were set by the last price walk.
    pub(crate) fn take_contributors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.contributors)
    }

    pub(crate) fn set_contributors(&mut self, ids: Vec<String>) {
        self.contributors = ids;
    }
}

impl<D: Direction> Default for SideBook<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Direction> fmt::Debug for SideBook<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SideBook")
            .field("side", &D::SIDE)
            .field("orders", &self.entries.len())
            .field("total", &self.total)
            .finish()
    }
}
