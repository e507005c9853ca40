//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop and headless hosts
//! (macOS, Windows, Linux, CI).
//!
//! ## Overview
//!
//! - `TokioSourceResolver` downloads remote audio with `reqwest` into a cache
//!   directory and resolves local paths with `tokio::fs`
//! - `SimulatedPlayer` / `SimulatedPlayerFactory` provide a wall-clock player
//!   for hosts without a native audio engine
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{SimulatedPlayerFactory, TokioSourceResolver};
//! use std::sync::Arc;
//!
//! let resolver = Arc::new(TokioSourceResolver::with_default_cache());
//! let factory = Arc::new(SimulatedPlayerFactory::new());
//! ```

mod resolver;
mod simulated;

pub use resolver::{TokioSourceResolver, FALLBACK_FILE_NAME};
pub use simulated::{SimulatedPlayer, SimulatedPlayerFactory};
