//! Weighted-average pricing of a hypothetical market order.

use rust_decimal::Decimal;
use tracing::debug;

use super::registry::OrderRegistry;
use super::side::{Direction, SideBook};
use crate::Result;
use crate::error::PricerError;

/// Outcome of walking a side book for a target quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// The target fills completely at this volume-weighted average price.
    Priced(Decimal),
    /// The book cannot absorb the whole target.
    Unavailable,
}

/// Prices a market order of `target` units against `book`, best price first.
///
/// Every order the walk takes quantity from gets that quantity recorded as
/// its `filled` mark, and the marks left by the previous walk on this book
/// are cleared first. When the book runs out before the target is met, no
/// marks are left set and [`Execution::Unavailable`] is returned. No
/// rounding happens here.
///
/// # Errors
///
/// Returns [`PricerError::ArithmeticOverflow`] if the weighted sum does not
/// fit a `Decimal`. Fill marks are left exactly as they were.
pub fn price_for_target<D: Direction>(
    book: &mut SideBook<D>,
    registry: &mut OrderRegistry,
    target: u64,
) -> Result<Execution> {
    let overflow = || {
        PricerError::ArithmeticOverflow(format!(
            "notional of {target} on the {:?} book exceeds decimal range",
            D::SIDE
        ))
    };

    let mut remaining = target;
    let mut notional = Decimal::ZERO;
    let mut fills: Vec<(String, u64)> = Vec::new();

    for order_id in book.iter_best_first() {
        if remaining == 0 {
            break;
        }
        let Ok(order) = registry.get(order_id) else {
            continue;
        };

        let taken = remaining.min(order.size);
        if taken == 0 {
            continue;
        }
        notional = order
            .price
            .checked_mul(Decimal::from(taken))
            .and_then(|cost| notional.checked_add(cost))
            .ok_or_else(overflow)?;
        remaining -= taken;
        fills.push((order.id.clone(), taken));
    }

    if remaining > 0 || target == 0 {
        clear_fills(book, registry);
        debug!(side = ?D::SIDE, target, short = remaining, "Book cannot fill target");
        return Ok(Execution::Unavailable);
    }

    let price = notional
        .checked_div(Decimal::from(target))
        .ok_or_else(overflow)?;

    clear_fills(book, registry);
    let mut contributors = Vec::with_capacity(fills.len());
    for (order_id, taken) in fills {
        if let Ok(order) = registry.get_mut(&order_id) {
            order.filled = taken;
        }
        contributors.push(order_id);
    }
    debug!(
        side = ?D::SIDE,
        target,
        orders = contributors.len(),
        %price,
        "Priced target"
    );
    book.set_contributors(contributors);
    Ok(Execution::Priced(price))
}

/// Resets the fill marks left on `book`'s orders by the last walk.
pub fn clear_fills<D: Direction>(book: &mut SideBook<D>, registry: &mut OrderRegistry) {
    for order_id in book.take_contributors() {
        if let Ok(order) = registry.get_mut(&order_id) {
            order.filled = 0;
        }
    }
}
