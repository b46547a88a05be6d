//! Time-related abstractions.
//!
//! Re-exports Tokio's timer primitives and adds [`ticker`], the fixed-rate
//! interval used for periodic status emission.
//!
//! ```rust
//! use core_async::time::{ticker, Duration};
//!
//! # async fn example() {
//! let mut ticks = ticker(Duration::from_millis(200));
//! ticks.tick().await; // completes immediately
//! ticks.tick().await; // ~200ms later
//! # }
//! ```

pub use tokio::time::{interval, sleep, timeout, Interval, MissedTickBehavior};

pub use std::time::Duration;

/// Creates a fixed-rate interval whose first tick completes immediately.
///
/// Ticks missed while the consumer was busy are skipped rather than burst, so
/// a slow subscriber never receives a backlog of stale snapshots.
///
/// # Panics
///
/// Panics if `period` is zero.
pub fn ticker(period: Duration) -> Interval {
    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn as_millis_u64(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_millis_u64() {
        assert_eq!(as_millis_u64(Duration::from_millis(1500)), 1500);
        assert_eq!(as_millis_u64(Duration::ZERO), 0);
        assert_eq!(as_millis_u64(Duration::from_secs(u64::MAX)), u64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_first_tick_is_immediate() {
        let start = std::time::Instant::now();
        let mut ticks = ticker(Duration::from_millis(200));
        ticks.tick().await;
        assert!(start.elapsed() < Duration::from_millis(200));
    }
}
