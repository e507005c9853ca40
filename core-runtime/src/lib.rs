//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the audio player core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus for playback and source notifications
//!
//! ## Overview
//!
//! The playback controller and the service façade both depend on this crate.
//! It establishes the logging conventions, the configuration surface and the
//! broadcast channel that UI layers observe.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
