//! Wall-clock player for headless hosts.
//!
//! `SimulatedPlayer` does not decode or output audio. It validates that the
//! prepared file exists, reports a duration, and advances its position with
//! the Tokio clock while playing. Natural completion is signalled from a
//! spawned timer task, never from inside a control call.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    player::{AudioPlayer, PlayerFactory, PlayerObserver, PrepareRequest},
};
use core_async::time::as_millis_u64;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Bitrate assumed when estimating a duration from the file size.
const ESTIMATED_BITRATE_BPS: u64 = 128_000;

#[derive(Default)]
struct SimulatedState {
    duration: Duration,
    looping: bool,
    prepared: bool,
    disposed: bool,
    /// Position accumulated before the current run.
    offset: Duration,
    /// Set while playing.
    started_at: Option<Instant>,
    /// Bumped on every play/pause/seek/dispose to retire completion timers.
    epoch: u64,
    observer: Option<Arc<dyn PlayerObserver>>,
}

impl SimulatedState {
    fn position(&self) -> Duration {
        let elapsed = self
            .started_at
            .map(|start| start.elapsed())
            .unwrap_or_default();
        let raw = self.offset + elapsed;

        if self.duration.is_zero() {
            return Duration::ZERO;
        }
        if self.looping {
            let nanos = raw.as_nanos() % self.duration.as_nanos();
            return Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX));
        }
        raw.min(self.duration)
    }
}

/// Simulated playback engine.
pub struct SimulatedPlayer {
    state: Arc<Mutex<SimulatedState>>,
    fixed_duration: Option<Duration>,
}

impl SimulatedPlayer {
    /// Player whose duration is estimated from the file size.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimulatedState::default())),
            fixed_duration: None,
        }
    }

    /// Player that reports `duration` for every file.
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            fixed_duration: Some(duration),
            ..Self::new()
        }
    }

    fn ensure_prepared(state: &SimulatedState) -> Result<()> {
        if state.disposed {
            return Err(BridgeError::Player("player disposed".to_string()));
        }
        if !state.prepared {
            return Err(BridgeError::Player("player not prepared".to_string()));
        }
        Ok(())
    }

    fn schedule_completion(&self, state: &SimulatedState) {
        if state.looping {
            return;
        }
        let Some(observer) = state.observer.clone() else {
            return;
        };
        let Ok(handle) = core_async::runtime::Handle::try_current() else {
            return;
        };

        let remaining = state.duration.saturating_sub(state.position());
        let epoch = state.epoch;
        let shared = Arc::clone(&self.state);

        handle.spawn(async move {
            core_async::time::sleep(remaining).await;
            let fire = {
                let mut state = shared.lock();
                if state.epoch != epoch || state.disposed {
                    false
                } else {
                    state.offset = state.duration;
                    state.started_at = None;
                    true
                }
            };
            if fire {
                debug!("Simulated playback reached end of file");
                observer.on_complete();
            }
        });
    }
}

impl Default for SimulatedPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioPlayer for SimulatedPlayer {
    async fn prepare(
        &self,
        request: PrepareRequest,
        observer: Arc<dyn PlayerObserver>,
    ) -> Result<Duration> {
        let metadata = tokio::fs::metadata(&request.path).await.map_err(|e| {
            BridgeError::Player(format!("cannot open {}: {}", request.path.display(), e))
        })?;

        let duration = match self.fixed_duration {
            Some(duration) => duration,
            None => Duration::from_millis(
                metadata.len().saturating_mul(8 * 1000) / ESTIMATED_BITRATE_BPS,
            ),
        };

        let mut state = self.state.lock();
        if state.disposed {
            return Err(BridgeError::Player("player disposed".to_string()));
        }
        state.duration = duration;
        state.looping = request.looping;
        state.prepared = true;
        state.offset = Duration::ZERO;
        state.started_at = None;
        state.observer = Some(observer);

        debug!(duration_ms = as_millis_u64(duration), "Simulated player prepared");
        Ok(duration)
    }

    fn play(&self) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_prepared(&state)?;
        if state.started_at.is_some() {
            return Ok(());
        }
        if !state.looping && state.offset >= state.duration {
            state.offset = Duration::ZERO;
        }
        state.epoch += 1;
        state.started_at = Some(Instant::now());
        self.schedule_completion(&state);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_prepared(&state)?;
        state.offset = state.position();
        state.started_at = None;
        state.epoch += 1;
        Ok(())
    }

    fn seek_to(&self, position: Duration) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_prepared(&state)?;
        state.offset = position.min(state.duration);
        state.epoch += 1;
        if state.started_at.is_some() {
            state.started_at = Some(Instant::now());
            self.schedule_completion(&state);
        }
        Ok(())
    }

    fn current_position(&self) -> Option<Duration> {
        let state = self.state.lock();
        if !state.prepared || state.disposed {
            return None;
        }
        Some(state.position())
    }

    fn dispose(&self) {
        let mut state = self.state.lock();
        state.disposed = true;
        state.started_at = None;
        state.epoch += 1;
        state.observer = None;
    }
}

/// Creates [`SimulatedPlayer`] instances.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPlayerFactory {
    fixed_duration: Option<Duration>,
}

impl SimulatedPlayerFactory {
    /// Factory whose players estimate durations from file size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose players report `duration` for every file.
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            fixed_duration: Some(duration),
        }
    }
}

impl PlayerFactory for SimulatedPlayerFactory {
    fn create(&self) -> Result<Box<dyn AudioPlayer>> {
        let player = match self.fixed_duration {
            Some(duration) => SimulatedPlayer::with_duration(duration),
            None => SimulatedPlayer::new(),
        };
        Ok(Box::new(player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::NamedTempFile;

    #[derive(Default)]
    struct CountingObserver {
        completions: AtomicUsize,
    }

    impl PlayerObserver for CountingObserver {
        fn on_complete(&self) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }

        fn on_error(&self, _message: String) {}
    }

    fn audio_file(bytes: usize) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), vec![0u8; bytes]).unwrap();
        file
    }

    #[tokio::test]
    async fn test_duration_estimated_from_size() {
        // 16 KB at 128 kbps is one second.
        let file = audio_file(16_000);
        let player = SimulatedPlayer::new();
        let duration = player
            .prepare(PrepareRequest::new(file.path()), Arc::new(CountingObserver::default()))
            .await
            .unwrap();
        assert_eq!(duration, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_prepare_missing_file_fails() {
        let player = SimulatedPlayer::new();
        let err = player
            .prepare(
                PrepareRequest::new("/definitely/not/here.mp3"),
                Arc::new(CountingObserver::default()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Player(_)));
    }

    #[tokio::test]
    async fn test_controls_require_prepare() {
        let player = SimulatedPlayer::with_duration(Duration::from_secs(5));
        assert!(player.play().is_err());
        assert!(player.current_position().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_follows_clock_and_completes_once() {
        let file = audio_file(10);
        let observer = Arc::new(CountingObserver::default());
        let player = SimulatedPlayer::with_duration(Duration::from_secs(3));
        player
            .prepare(PrepareRequest::new(file.path()), observer.clone())
            .await
            .unwrap();

        player.play().unwrap();
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(player.current_position(), Some(Duration::from_millis(1500)));

        player.pause().unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(player.current_position(), Some(Duration::from_millis(1500)));
        assert_eq!(observer.completions.load(Ordering::SeqCst), 0);

        player.play().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(player.current_position(), Some(Duration::from_secs(3)));
        assert_eq!(observer.completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_and_dispose() {
        let file = audio_file(10);
        let observer = Arc::new(CountingObserver::default());
        let player = SimulatedPlayer::with_duration(Duration::from_secs(3));
        player
            .prepare(PrepareRequest::new(file.path()), observer.clone())
            .await
            .unwrap();

        player.seek_to(Duration::from_secs(2)).unwrap();
        assert_eq!(player.current_position(), Some(Duration::from_secs(2)));

        player.play().unwrap();
        player.dispose();
        player.dispose();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(player.current_position().is_none());
        assert_eq!(observer.completions.load(Ordering::SeqCst), 0);
        assert!(player.play().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_looping_wraps_without_completion() {
        let file = audio_file(10);
        let observer = Arc::new(CountingObserver::default());
        let player = SimulatedPlayer::with_duration(Duration::from_secs(2));
        player
            .prepare(
                PrepareRequest::new(file.path()).with_looping(true),
                observer.clone(),
            )
            .await
            .unwrap();

        player.play().unwrap();
        tokio::time::advance(Duration::from_millis(2500)).await;
        assert_eq!(player.current_position(), Some(Duration::from_millis(500)));
        assert_eq!(observer.completions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_looping_position_stays_in_range_for_long_offsets() {
        let state = SimulatedState {
            duration: Duration::from_secs(3),
            looping: true,
            prepared: true,
            offset: Duration::from_secs(10_000_000_001),
            ..Default::default()
        };
        assert_eq!(state.position(), Duration::from_secs(2));
    }

    #[test]
    fn test_factory_creates_fresh_players() {
        let factory = SimulatedPlayerFactory::with_duration(Duration::from_secs(1));
        let first = factory.create().unwrap();
        let second = factory.create().unwrap();
        first.dispose();
        assert!(second.current_position().is_none());
    }
}
