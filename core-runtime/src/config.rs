//! # Core Configuration Module
//!
//! Provides configuration management for the audio player core.
//!
//! ## Overview
//!
//! Two layers of configuration exist:
//!
//! - [`PlayerConfig`] holds plain, serializable tuning values (sampling cadence,
//!   position granularity, looping, event buffer size). Hosts may ship it as
//!   JSON next to their app settings.
//! - [`CoreConfig`] bundles a `PlayerConfig` with the bridge capabilities the
//!   core needs at runtime. It is built through [`CoreConfigBuilder`], which
//!   fails fast when a required capability is missing.
//!
//! ## Required Dependencies
//!
//! - `PlayerFactory` - the native audio engine; there is no default.
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `SourceResolver` - desktop default: `bridge_desktop::TokioSourceResolver`
//!   (requires the `desktop-shims` feature)
//! - `LoggerSink` - host log forwarding
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, PlayerConfig};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .player_factory(Arc::new(MyNativePlayerFactory))
//!     .player_config(PlayerConfig::default().with_looping(true))
//!     .cache_dir("/data/app/cache")
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{LoggerSink, PlayerFactory, SourceResolver};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Player Configuration
// ============================================================================

/// Tuning values for the playback controller and its progress sampler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// How often the sampler reads the engine position.
    ///
    /// Default: 100 ms.
    #[serde(default = "default_sample_interval")]
    pub sample_interval: Duration,

    /// Resolution at which position updates are published. Readings that
    /// floor to the same multiple of this value as the previous publication
    /// are suppressed.
    ///
    /// Default: 1 second.
    #[serde(default = "default_position_granularity")]
    pub position_granularity: Duration,

    /// Whether prepared files loop at the end.
    ///
    /// Default: false.
    #[serde(default)]
    pub looping: bool,

    /// Capacity of the event bus channel.
    ///
    /// Default: 100 events.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sample_interval: default_sample_interval(),
            position_granularity: default_position_granularity(),
            looping: false,
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl PlayerConfig {
    /// Parse a configuration from JSON, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the sampling interval.
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Set the publication granularity.
    pub fn with_position_granularity(mut self, granularity: Duration) -> Self {
        self.position_granularity = granularity;
        self
    }

    /// Enable or disable looping.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set the event bus capacity.
    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.sample_interval.is_zero() {
            return Err(Error::invalid("sample_interval", "must be greater than zero"));
        }

        if self.position_granularity.is_zero() {
            return Err(Error::invalid(
                "position_granularity",
                "must be greater than zero",
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::invalid("event_buffer_size", "must be greater than zero"));
        }

        Ok(())
    }
}

fn default_sample_interval() -> Duration {
    Duration::from_millis(100)
}

fn default_position_granularity() -> Duration {
    Duration::from_secs(1)
}

fn default_event_buffer_size() -> usize {
    crate::events::DEFAULT_EVENT_BUFFER_SIZE
}

// ============================================================================
// Core Configuration
// ============================================================================

/// Core configuration: tuning values plus bridge capabilities.
#[derive(Clone)]
pub struct CoreConfig {
    /// Sampler and controller tuning
    pub player: PlayerConfig,

    /// Directory where downloaded audio files are stored
    pub cache_dir: PathBuf,

    /// Allocates native players (required)
    pub player_factory: Arc<dyn PlayerFactory>,

    /// Turns URLs into local files (optional with desktop default)
    pub source_resolver: Arc<dyn SourceResolver>,

    /// Host log forwarding (optional)
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("player", &self.player)
            .field("cache_dir", &self.cache_dir)
            .field("player_factory", &"PlayerFactory { ... }")
            .field("source_resolver", &"SourceResolver { ... }")
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(Error::invalid("cache_dir", "cannot be empty"));
        }
        self.player.validate()
    }
}

fn player_factory_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "PlayerFactory",
        message: "A PlayerFactory implementation is required to create native audio players. \
                 Mobile: inject the platform media player plugin. \
                 Headless/desktop: use bridge_desktop::SimulatedPlayerFactory."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_source_resolver(cache_dir: &std::path::Path) -> Result<Arc<dyn SourceResolver>> {
    use bridge_desktop::TokioSourceResolver;

    let resolver: Arc<dyn SourceResolver> = Arc::new(TokioSourceResolver::new(cache_dir));
    Ok(resolver)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_source_resolver(_cache_dir: &std::path::Path) -> Result<Arc<dyn SourceResolver>> {
    Err(Error::CapabilityMissing {
        capability: "SourceResolver",
        message: "A SourceResolver implementation is required to turn URLs into local files. \
                 Desktop: enable the 'desktop-shims' feature to use TokioSourceResolver. \
                 Mobile: inject the platform download service."
            .to_string(),
    })
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("audio-player-core")
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    player: Option<PlayerConfig>,
    cache_dir: Option<PathBuf>,
    player_factory: Option<Arc<dyn PlayerFactory>>,
    source_resolver: Option<Arc<dyn SourceResolver>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
}

impl CoreConfigBuilder {
    /// Sets the sampler and controller tuning values.
    pub fn player_config(mut self, config: PlayerConfig) -> Self {
        self.player = Some(config);
        self
    }

    /// Sets the download directory. Defaults to a folder under the system
    /// temp directory.
    pub fn cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    /// Sets the native player factory (required).
    pub fn player_factory(mut self, factory: Arc<dyn PlayerFactory>) -> Self {
        self.player_factory = Some(factory);
        self
    }

    /// Sets the source resolver.
    pub fn source_resolver(mut self, resolver: Arc<dyn SourceResolver>) -> Self {
        self.source_resolver = Some(resolver);
        self
    }

    /// Sets a host logger sink.
    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Fails with [`Error::CapabilityMissing`] when no player factory was
    /// provided, or when no source resolver was provided and no platform
    /// default is compiled in.
    pub fn build(self) -> Result<CoreConfig> {
        let player_factory = self
            .player_factory
            .ok_or_else(player_factory_missing_error)?;

        let cache_dir = self.cache_dir.unwrap_or_else(default_cache_dir);

        let source_resolver = match self.source_resolver {
            Some(resolver) => resolver,
            None => provide_default_source_resolver(&cache_dir)?,
        };

        let config = CoreConfig {
            player: self.player.unwrap_or_default(),
            cache_dir,
            player_factory,
            source_resolver,
            logger_sink: self.logger_sink,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{AudioPlayer, BridgeError, ResolvedSource};

    struct NoPlayers;

    impl PlayerFactory for NoPlayers {
        fn create(&self) -> BridgeResult<Box<dyn AudioPlayer>> {
            Err(BridgeError::NotAvailable("test factory".to_string()))
        }
    }

    struct EchoResolver;

    #[async_trait]
    impl SourceResolver for EchoResolver {
        async fn resolve(&self, reference: &str) -> BridgeResult<ResolvedSource> {
            Ok(ResolvedSource::from_path(reference))
        }
    }

    #[test]
    fn test_default_player_config() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_interval, Duration::from_millis(100));
        assert_eq!(config.position_granularity, Duration::from_secs(1));
        assert!(!config.looping);
        assert_eq!(config.event_buffer_size, 100);
    }

    #[test]
    fn test_player_config_validation() {
        let config = PlayerConfig::default().with_sample_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = PlayerConfig::default().with_position_granularity(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = PlayerConfig::default().with_event_buffer_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_player_config_from_partial_json() {
        let config = PlayerConfig::from_json(r#"{ "looping": true }"#).unwrap();
        assert!(config.looping);
        assert_eq!(config.sample_interval, Duration::from_millis(100));

        let config = PlayerConfig::from_json(
            r#"{ "sample_interval": { "secs": 0, "nanos": 250000000 } }"#,
        )
        .unwrap();
        assert_eq!(config.sample_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_player_config_rejects_invalid_json() {
        let err = PlayerConfig::from_json(r#"{ "event_buffer_size": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("event_buffer_size"));

        let err = PlayerConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, Error::MalformedConfig(_)));
    }

    #[test]
    fn test_builder_requires_player_factory() {
        let result = CoreConfig::builder()
            .source_resolver(Arc::new(EchoResolver))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "PlayerFactory")
            }
            other => panic!("expected missing PlayerFactory, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_builder_with_explicit_bridges() {
        let config = CoreConfig::builder()
            .player_factory(Arc::new(NoPlayers))
            .source_resolver(Arc::new(EchoResolver))
            .player_config(PlayerConfig::default().with_looping(true))
            .cache_dir("/tmp/audio-cache")
            .build()
            .unwrap();

        assert!(config.player.looping);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/audio-cache"));
        assert!(config.logger_sink.is_none());
    }

    #[test]
    fn test_builder_rejects_invalid_player_config() {
        let result = CoreConfig::builder()
            .player_factory(Arc::new(NoPlayers))
            .source_resolver(Arc::new(EchoResolver))
            .player_config(PlayerConfig::default().with_sample_interval(Duration::ZERO))
            .build();
        assert!(matches!(
            result,
            Err(Error::InvalidSetting {
                field: "sample_interval",
                ..
            })
        ));
    }

    #[test]
    fn test_builder_rejects_empty_cache_dir() {
        let err = CoreConfig::builder()
            .player_factory(Arc::new(NoPlayers))
            .source_resolver(Arc::new(EchoResolver))
            .cache_dir("")
            .build()
            .err()
            .unwrap();
        assert!(err.is_invalid_config());
        assert_eq!(err.to_string(), "Invalid setting `cache_dir`: cannot be empty");
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_resolver_without_desktop_shims() {
        let result = CoreConfig::builder()
            .player_factory(Arc::new(NoPlayers))
            .build();
        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if *capability == "SourceResolver"
        ));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_builder_provides_desktop_resolver() {
        let config = CoreConfig::builder()
            .player_factory(Arc::new(NoPlayers))
            .build()
            .expect("desktop resolver default");
        assert!(config.cache_dir.ends_with("audio-player-core"));
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = CoreConfig::builder()
            .player_factory(Arc::new(NoPlayers))
            .source_resolver(Arc::new(EchoResolver))
            .build()
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("PlayerFactory { ... }"));
    }
}
