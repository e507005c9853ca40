//! # Host Bridge Traits
//!
//! Capabilities the audio player core consumes but cannot implement itself.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and
//! platform-specific implementations. Each trait is a capability that must be
//! provided differently per platform (mobile plugin, desktop, headless tests).
//!
//! ## Traits
//!
//! ### Playback
//! - [`AudioPlayer`](player::AudioPlayer) - Opaque native playback engine
//! - [`PlayerFactory`](player::PlayerFactory) - Allocates one engine per load
//! - [`PlayerObserver`](player::PlayerObserver) - Completion/error notifications
//!
//! ### Sources
//! - [`SourceResolver`](source::SourceResolver) - Remote URL to local file
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing:
//!
//! ```ignore
//! let factory = config.player_factory
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "PlayerFactory".to_string(),
//!         message: "No audio engine provided by the host".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep messages human readable:
//! they end up in the player's error phase.

pub mod error;
pub mod logging;
pub mod platform;
pub mod player;
pub mod source;

pub use error::BridgeError;

pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use player::{AudioPlayer, NoopObserver, PlayerFactory, PlayerObserver, PrepareRequest};
pub use source::{ResolvedSource, SourceResolver};
