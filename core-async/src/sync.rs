//! Synchronization primitives.
//!
//! Async-aware channels and locks from `tokio::sync`, plus the
//! [`CancellationToken`] used to stop recurring tasks cooperatively.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let child = token.child_token();
//! token.cancel();
//! assert!(child.is_cancelled());
//! ```

pub use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock};

pub use tokio_util::sync::CancellationToken;
