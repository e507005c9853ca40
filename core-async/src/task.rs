//! Task spawning and execution abstractions.
//!
//! Spawned tasks may run on any worker thread, so futures must be `Send`.
//! A [`JoinHandle`] can be awaited for the task's output or aborted; aborting
//! is how owners tear down long-running loops such as the progress sampler.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub use tokio::task::{spawn_blocking, yield_now, AbortHandle, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current Tokio runtime.
///
/// # Panics
///
/// Panics when called outside a runtime. Callers that may run outside one
/// should use [`spawn_on`] with a handle obtained from
/// [`crate::runtime::Handle::try_current`].
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Spawns a task on an explicit runtime handle.
pub fn spawn_on<F>(handle: &crate::runtime::Handle, future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    handle.spawn(future)
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
