//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target.
//!
//! Native player handles are polled from the sampler task and driven from the
//! caller's thread, so every bridge object must be shareable across threads.

/// Marker trait that applies `Send + Sync` to bridge implementations.
pub trait PlatformSendSync: Send + Sync {}

impl<T> PlatformSendSync for T where T: Send + Sync {}
