//! Crate-level error types.
//!
//! [`PricerError`] unifies every failure the pricer can report (book
//! bookkeeping, feed parsing, configuration, I/O) behind a single enum so
//! callers can match on the variant they care about while still using the
//! `?` operator for easy propagation.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PricerError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum PricerError {
    /// An Add event reused the id of an order that is still live.
    #[error("duplicate order id: {0}")]
    DuplicateOrderId(String),

    /// A Reduce event (or lookup) referenced an order that is not live.
    #[error("unknown order id: {0}")]
    UnknownOrderId(String),

    /// Accepting an order or pricing the book would overflow size or
    /// notional arithmetic. The event is rejected with the book unchanged.
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// A feed line did not have the shape of an Add or Reduce event.
    #[error("malformed event on line {line}: {reason}")]
    MalformedEvent { line: usize, reason: String },

    /// The run configuration was missing or unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Reading the feed or writing quotes failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON configuration file could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
