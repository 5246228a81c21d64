//! Target-size market order pricer for a limit order book feed.
//!
//! Consumes Add and Reduce events for one instrument and, after each one,
//! reports the volume-weighted average price at which a market order of a
//! fixed size could be filled entirely against the resting orders, or `NA`
//! once that stops being possible.

pub mod book;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;

pub use book::BookController;
pub use error::{PricerError, Result};
