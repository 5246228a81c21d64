//! Line-oriented feed reader and quote writer.
//!
//! Each input line is one event:
//!
//! ```text
//! <timestamp> A <order-id> <side> <price> <size>
//! <timestamp> R <order-id> <size>
//! ```
//!
//! Every quote the book produces is written as one output line. Events are
//! applied strictly in the order they are read.

use std::str::FromStr;

use rust_decimal::Decimal;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::Result;
use crate::book::BookController;
use crate::error::PricerError;
use crate::models::{AddOrder, Event, ReduceOrder, Side};

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub events: u64,
    pub quotes: u64,
    pub skipped: u64,
}

/// Parses one feed line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`PricerError::MalformedEvent`] naming `line_no` when the line is
/// not a well-formed Add or Reduce event.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Event>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }

    let malformed = |reason: String| PricerError::MalformedEvent {
        line: line_no,
        reason,
    };

    match fields.as_slice() {
        [timestamp, "A", order_id, side, price, size] => {
            let price: Decimal = field(price, "price").map_err(malformed)?;
            if price.is_sign_negative() {
                return Err(malformed(format!("negative price {price}")));
            }
            let size: u64 = field(size, "size").map_err(malformed)?;
            if size == 0 {
                return Err(malformed("add with zero size".to_string()));
            }

            Ok(Some(Event::Add(AddOrder {
                timestamp: field(timestamp, "timestamp").map_err(malformed)?,
                order_id: order_id.to_string(),
                side: side.parse::<Side>().map_err(malformed)?,
                price,
                size,
            })))
        }
        [timestamp, "R", order_id, size] => Ok(Some(Event::Reduce(ReduceOrder {
            timestamp: field(timestamp, "timestamp").map_err(malformed)?,
            order_id: order_id.to_string(),
            size: field(size, "size").map_err(malformed)?,
        }))),
        [_, "A", ..] => Err(malformed(format!(
            "add needs 6 fields, found {}",
            fields.len()
        ))),
        [_, "R", ..] => Err(malformed(format!(
            "reduce needs 4 fields, found {}",
            fields.len()
        ))),
        [_, kind, ..] => Err(malformed(format!("unknown event type {kind:?}"))),
        [_] => Err(malformed("missing event type".to_string())),
        [] => Ok(None),
    }
}

fn field<T: FromStr>(raw: &str, name: &str) -> std::result::Result<T, String> {
    raw.parse()
        .map_err(|_| format!("invalid {name} {raw:?}"))
}

/// Reads events from `reader` until end of input, applying each to `book`
/// and writing every resulting quote to `writer`.
///
/// Duplicate order ids and events that overflow the book's arithmetic are
/// logged and skipped. Output is flushed before returning.
///
/// # Errors
///
/// Stops at the first malformed line or I/O failure and returns it.
pub async fn run<R, W>(reader: R, writer: &mut W, book: &mut BookController) -> Result<RunStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = RunStats::default();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let Some(event) = parse_line(line_no, &line)? else {
            continue;
        };
        stats.events += 1;

        match book.apply(&event) {
            Ok(Some(quote)) => {
                writer.write_all(format!("{quote}\n").as_bytes()).await?;
                stats.quotes += 1;
            }
            Ok(None) => {}
            Err(err @ (PricerError::DuplicateOrderId(_) | PricerError::ArithmeticOverflow(_))) => {
                warn!(
                    %err,
                    line = line_no,
                    timestamp = event.timestamp(),
                    order_id = event.order_id(),
                    "Skipping event"
                );
                stats.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    writer.flush().await?;
    debug!(lines = line_no, "Reached end of feed");
    info!(
        events = stats.events,
        quotes = stats.quotes,
        skipped = stats.skipped,
        "Feed processed"
    );
    Ok(stats)
}
