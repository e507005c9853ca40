//! Time-related abstractions.
//!
//! `sleep`, `interval` and `timeout` integrate with Tokio's timer wheel, so a
//! test runtime built with a paused clock drives them deterministically.
//! `Instant` is the standard monotonic instant.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{interval, Duration, MissedTickBehavior};
//!
//! async fn example() {
//!     let mut ticker = interval(Duration::from_millis(100));
//!     ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
//!     ticker.tick().await; // first tick completes immediately
//! }
//! ```

pub use tokio::time::{
    interval, sleep, sleep_until, timeout, Interval, MissedTickBehavior, Sleep, Timeout,
};

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Returns the current time as milliseconds since UNIX_EPOCH.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(as_millis_u64)
        .unwrap_or_default()
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn as_millis_u64(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
