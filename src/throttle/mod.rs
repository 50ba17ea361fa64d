//! Per-download bandwidth throttling
//!
//! A [`RateLimitedReader`] wraps any `AsyncRead` and meters it through a
//! [`RateBucket`] that is refilled to full capacity once per second. Every
//! download gets its own reader, so there is no global cap across concurrent
//! downloads.

mod bucket;
mod reader;

pub use bucket::{parse_rate, RateBucket, REFILL_INTERVAL};
pub use reader::RateLimitedReader;
