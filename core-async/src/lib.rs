//! Async abstraction layer for the audio player core.
//!
//! Every core-* crate spawns tasks, sleeps and ticks through this crate rather
//! than reaching for Tokio directly. Keeping the executor behind one facade
//! means the playback sampler, the event bus and the desktop bridges all agree
//! on the same timer wheel, which is what the paused-clock tests rely on.
//!
//! # Modules
//!
//! - `task`: Task spawning and join handles
//! - `time`: Sleep, intervals, timeouts, instants
//! - `sync`: Channels, async mutexes and cancellation tokens
//! - `runtime`: Blocking entry points and runtime handles
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(10)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};

/// Waits on multiple concurrent branches, returning when the first completes.
pub use tokio::select;
