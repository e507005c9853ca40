//! # Playback Core
//!
//! Playback state machine and progress synchronizer for a native audio
//! player.
//!
//! ## Overview
//!
//! - [`PlaybackController`] owns the phase (`Idle → Loading → Ready →
//!   Playing/Paused → Ended/Error`), validates commands and forwards them to
//!   the player obtained from a [`PlayerFactory`](bridge_traits::PlayerFactory).
//! - [`ProgressSampler`] reads the player position on a fixed cadence while
//!   playing, suppresses duplicate publications and detects the end of the
//!   file when the native completion callback does not arrive.
//!
//! Observers read [`PlaybackSnapshot`]s and subscribe to
//! [`PlaybackEvent`](core_runtime::events::PlaybackEvent)s on the event bus.
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::PlaybackController;
//! use std::time::Duration;
//!
//! let controller = PlaybackController::with_defaults(factory);
//! controller.load("/cache/voice-note.m4a").await?;
//! controller.toggle()?;
//! controller.seek(Duration::from_secs(30))?;
//! controller.dispose();
//! ```

pub mod controller;
pub mod error;
pub mod sampler;
pub mod state;

pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use sampler::{Observation, ProgressSampler, TickOutcome};
pub use state::{progress_fraction, PlaybackPhase, PlaybackSnapshot};
