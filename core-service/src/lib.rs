//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (player engine,
//! source resolver, log sink) into the playback core and exposes one
//! [`AudioPlayerService`] per player widget. Desktop and headless hosts
//! typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`) to get a download-capable resolver and a simulated
//! player.
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .player_factory(Arc::new(MyNativePlayerFactory))
//!     .build()?;
//! let player = AudioPlayerService::new(config)?;
//! player.load("https://cdn.example.com/greeting.mp3").await?;
//! player.toggle_play()?;
//! ```

pub mod error;
mod service;
pub mod view;

pub use error::{CoreError, Result};
pub use service::AudioPlayerService;
pub use view::{format_clock, PlayerView};

pub use core_playback::{PlaybackPhase, PlaybackSnapshot};
pub use core_runtime::config::{CoreConfig, PlayerConfig};
pub use core_runtime::events::{CoreEvent, PlaybackEvent, SourceEvent};

use core_runtime::logging::LoggingConfig;

/// Install the global tracing subscriber, forwarding to the host log sink
/// from `config` when one was provided.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &CoreConfig, logging: LoggingConfig) -> Result<()> {
    let logging = match &config.logger_sink {
        Some(sink) => logging.with_logger_sink(sink.clone()),
        None => logging,
    };
    core_runtime::logging::init_logging(logging)?;
    Ok(())
}

/// Build a service backed by the simulated desktop player.
///
/// Durations are estimated from file sizes; files are resolved through the
/// default resolver and cached in the default cache directory.
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_simulated(player: PlayerConfig) -> Result<AudioPlayerService> {
    use std::sync::Arc;

    let config = CoreConfig::builder()
        .player_config(player)
        .player_factory(Arc::new(bridge_desktop::SimulatedPlayerFactory::new()))
        .build()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    AudioPlayerService::new(config)
}
