//! Runtime utilities that abstract over the underlying async executor.
//!
//! Downstream crates use [`Handle::try_current`] to find the executor that a
//! synchronous API was called from (the playback controller starts its sampler
//! this way) and [`block_on`] for synchronous entry points and tests.

pub use tokio::runtime::{Builder, Handle, Runtime, TryCurrentError};

/// Runs the provided future to completion using a lightweight runtime.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Returns `true` when the caller is running inside an async runtime.
pub fn in_runtime() -> bool {
    Handle::try_current().is_ok()
}
