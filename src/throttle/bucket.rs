use crate::MirrorError;
use std::time::Duration;
use tokio::time::Instant;

/// How long an empty bucket waits before it is refilled
pub const REFILL_INTERVAL: Duration = Duration::from_secs(1);

/// Token bucket holding one second's worth of bytes
#[derive(Debug, Clone)]
pub struct RateBucket {
    rate_per_second: u64,
    remaining: u64,
    last_refill: Instant,
}

impl RateBucket {
    /// Creates a full bucket; a zero rate is treated as one byte per second
    pub fn new(rate_per_second: u64) -> Self {
        let rate_per_second = rate_per_second.max(1);
        Self {
            rate_per_second,
            remaining: rate_per_second,
            last_refill: Instant::now(),
        }
    }

    /// Bytes per second this bucket allows
    pub fn rate_per_second(&self) -> u64 {
        self.rate_per_second
    }

    /// Tokens left before the next refill
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// When the bucket was last filled
    pub fn last_refill(&self) -> Instant {
        self.last_refill
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// How much of a `requested` read may be served right now
    pub fn available(&self, requested: usize) -> usize {
        // remaining never exceeds the rate, which fits a usize on all supported targets
        requested.min(usize::try_from(self.remaining).unwrap_or(usize::MAX))
    }

    /// Spends tokens for bytes that were actually delivered
    pub fn consume(&mut self, bytes: usize) {
        self.remaining = self.remaining.saturating_sub(bytes as u64);
    }

    /// Fills the bucket back to capacity
    pub fn refill(&mut self, now: Instant) {
        self.remaining = self.rate_per_second;
        self.last_refill = now;
    }
}

/// Parses a rate such as `400k`, `400K` or `2M` into bytes per second
///
/// `k`/`K` multiply by 1024, `M` by 1024². A bare number is taken as bytes
/// per second. Zero and anything unparsable are rejected.
///
/// # Examples
///
/// ```
/// use site_mirror::throttle::parse_rate;
///
/// assert_eq!(parse_rate("10k").unwrap(), 10 * 1024);
/// assert_eq!(parse_rate("2M").unwrap(), 2 * 1024 * 1024);
/// assert!(parse_rate("fast").is_err());
/// ```
pub fn parse_rate(rate: &str) -> Result<u64, MirrorError> {
    let invalid = || MirrorError::InvalidRateLimit(rate.to_string());
    let trimmed = rate.trim();

    let (digits, multiplier) = if let Some(digits) = trimmed.strip_suffix(['k', 'K']) {
        (digits, 1024)
    } else if let Some(digits) = trimmed.strip_suffix('M') {
        (digits, 1024 * 1024)
    } else {
        (trimmed, 1)
    };

    let value: u64 = digits.parse().map_err(|_| invalid())?;
    if value == 0 {
        return Err(invalid());
    }

    value.checked_mul(multiplier).ok_or_else(invalid)
}
