//! Player bridge traits and supporting types.
//!
//! These abstractions let the playback core drive a platform audio engine
//! (a mobile media player plugin, a desktop output stream, a simulated engine
//! for headless hosts) without knowing anything about decoding. The core treats
//! the engine as an opaque capability: prepare a local file, play, pause, seek,
//! read the position, dispose.
//!
//! # Ownership
//!
//! One [`AudioPlayer`] instance corresponds to one prepared file. The playback
//! controller asks a [`PlayerFactory`] for a fresh instance on every load and
//! disposes the previous one first, so implementations never need to support
//! re-preparing.
//!
//! # Notifications
//!
//! Engines report natural completion and mid-playback failures through the
//! [`PlayerObserver`] handed to [`AudioPlayer::prepare`]. Observers must be
//! invoked from the engine's own callback context, never synchronously from
//! inside a control call such as [`AudioPlayer::play`], because the controller
//! serializes its transitions behind a lock held during those calls.

use crate::{error::Result, platform::PlatformSendSync};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Parameters for preparing a local audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareRequest {
    /// Local path of the file to prepare.
    pub path: PathBuf,
    /// Whether the engine should loop automatically at the end of the file.
    pub looping: bool,
}

impl PrepareRequest {
    /// Create a non-looping request for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            looping: false,
        }
    }

    /// Set the looping flag.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}

/// Receives one-shot notifications from a prepared player.
///
/// Both callbacks may arrive late (after the controller moved on to another
/// file or was disposed); receivers are expected to ignore stale calls.
pub trait PlayerObserver: PlatformSendSync {
    /// Playback reached the natural end of the file.
    fn on_complete(&self);

    /// The engine failed while playing or paused.
    fn on_error(&self, message: String);
}

/// Observer that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PlayerObserver for NoopObserver {
    fn on_complete(&self) {}

    fn on_error(&self, _message: String) {}
}

/// Trait for platform playback engines.
#[async_trait::async_trait]
pub trait AudioPlayer: PlatformSendSync {
    /// Prepare the file described by `request` and return its total duration.
    ///
    /// This is the only long-latency call. `observer` receives the engine's
    /// completion and error notifications for the lifetime of this instance.
    async fn prepare(
        &self,
        request: PrepareRequest,
        observer: Arc<dyn PlayerObserver>,
    ) -> Result<Duration>;

    /// Begin or resume playback. Returns once the request was issued.
    fn play(&self) -> Result<()>;

    /// Pause playback without releasing the prepared file.
    fn pause(&self) -> Result<()>;

    /// Seek to an absolute position. Returns once the request was issued.
    fn seek_to(&self, position: Duration) -> Result<()>;

    /// Current playback position, or `None` when the engine cannot report one
    /// right now (for example while it is still settling after a seek).
    fn current_position(&self) -> Option<Duration>;

    /// Release native resources. Must be idempotent.
    fn dispose(&self);
}

/// Creates a fresh [`AudioPlayer`] for every load.
pub trait PlayerFactory: PlatformSendSync {
    /// Allocate a new, unprepared player.
    fn create(&self) -> Result<Box<dyn AudioPlayer>>;
}

impl<F> PlayerFactory for F
where
    F: Fn() -> Result<Box<dyn AudioPlayer>> + PlatformSendSync,
{
    fn create(&self) -> Result<Box<dyn AudioPlayer>> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mockall::mock! {
        pub Player {}

        #[async_trait::async_trait]
        impl AudioPlayer for Player {
            async fn prepare(
                &self,
                request: PrepareRequest,
                observer: Arc<dyn PlayerObserver>,
            ) -> Result<Duration>;
            fn play(&self) -> Result<()>;
            fn pause(&self) -> Result<()>;
            fn seek_to(&self, position: Duration) -> Result<()>;
            fn current_position(&self) -> Option<Duration>;
            fn dispose(&self);
        }
    }

    #[test]
    fn prepare_request_defaults_to_non_looping() {
        let request = PrepareRequest::new("/tmp/voice-note.m4a");
        assert_eq!(request.path, PathBuf::from("/tmp/voice-note.m4a"));
        assert!(!request.looping);
        assert!(request.with_looping(true).looping);
    }

    #[test]
    fn closures_act_as_factories() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let factory = move || -> Result<Box<dyn AudioPlayer>> {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut player = MockPlayer::new();
            player.expect_dispose().return_const(());
            Ok(Box::new(player))
        };

        let player = factory.create().unwrap();
        player.dispose();
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_factory_surfaces_bridge_error() {
        let factory = || -> Result<Box<dyn AudioPlayer>> {
            Err(BridgeError::NotAvailable("audio session".into()))
        };
        let err = factory.create().err().unwrap();
        assert!(err.to_string().contains("audio session"));
    }

    #[core_async::test]
    async fn mock_player_prepare_reports_duration() {
        let mut player = MockPlayer::new();
        player
            .expect_prepare()
            .withf(|request, _| request.path == PathBuf::from("clip.mp3"))
            .returning(|_, _| Ok(Duration::from_secs(180)));

        let duration = player
            .prepare(PrepareRequest::new("clip.mp3"), Arc::new(NoopObserver))
            .await
            .unwrap();
        assert_eq!(duration, Duration::from_secs(180));
    }
}
