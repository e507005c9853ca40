//! # Playback Controller
//!
//! Drives one native player through the playback state machine:
//!
//! ```text
//! Idle ──load──> Loading ──prepared──> Ready <──> Playing <──> Paused
//!                   │                               │   (toggle/play/pause)
//!                   └──failed──> Error               └──end of file──> Ended ──replay──> Playing
//! ```
//!
//! ## Serialization
//!
//! Every transition (commands, sampler ticks, player notifications) runs
//! under one `parking_lot::Mutex`. The lock is never held across an await:
//! `load` releases it while the player prepares and re-validates afterwards
//! against a load generation, so a superseded or disposed load cannot touch
//! the current state.
//!
//! ## Sampling
//!
//! While `Playing`, a [`ProgressSampler`] reads the player position on a
//! fixed period, publishes `PositionChanged` events when the floored position
//! moves, and completes playback when the reading reaches the duration. It is
//! stopped by every transition out of `Playing`.

use crate::error::{PlaybackError, Result};
use crate::sampler::{Observation, ProgressSampler, TickOutcome};
use crate::state::{PlaybackPhase, PlaybackSnapshot};
use bridge_traits::source::file_label;
use bridge_traits::{AudioPlayer, PlayerFactory, PlayerObserver, PrepareRequest};
use core_async::time::as_millis_u64;
use core_runtime::config::PlayerConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, Receiver};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, error, info, warn};

struct ControllerInner {
    phase: PlaybackPhase,
    duration: Duration,
    position: Duration,
    source_label: Option<String>,
    player: Option<Arc<dyn AudioPlayer>>,
    /// Player of the load currently preparing, owned here so that whoever
    /// retires the load releases it.
    pending: Option<Arc<dyn AudioPlayer>>,
    sampler: ProgressSampler,
    /// Bumped by every load, failure report and dispose.
    load_generation: u64,
    disposed: bool,
}

impl ControllerInner {
    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase: self.phase.clone(),
            duration: self.duration,
            position: self.position,
            source_label: self.source_label.clone(),
        }
    }

    fn release_player(&mut self) {
        self.sampler.stop();
        if let Some(player) = self.player.take() {
            player.dispose();
        }
        if let Some(pending) = self.pending.take() {
            debug!(generation = self.load_generation, "Releasing player of retired load");
            pending.dispose();
        }
    }

    fn reset_media(&mut self) {
        self.duration = Duration::ZERO;
        self.position = Duration::ZERO;
        self.source_label = None;
    }
}

struct Shared {
    inner: Mutex<ControllerInner>,
    factory: Arc<dyn PlayerFactory>,
    events: EventBus,
    looping: bool,
}

impl Shared {
    fn emit(&self, event: PlaybackEvent) {
        self.events.emit(CoreEvent::Playback(event)).ok();
    }

    /// Start the sampler and the player. On a player error the controller
    /// moves to `Error`.
    fn begin_playback(self: &Arc<Self>, inner: &mut ControllerInner) -> Result<()> {
        let Some(player) = inner.player.clone() else {
            return Err(PlaybackError::NotReady {
                phase: inner.phase.clone(),
            });
        };

        let weak = Arc::downgrade(self);
        let generation = inner
            .sampler
            .start(move |generation| Shared::on_tick(&weak, generation))?;

        if let Err(err) = player.play() {
            let message = err.to_string();
            self.fail_playback(inner, message.clone());
            return Err(PlaybackError::PlaybackFailed(message));
        }

        inner.phase = PlaybackPhase::Playing;
        info!(
            position_ms = as_millis_u64(inner.position),
            sampler_generation = generation,
            "Playback started"
        );
        self.emit(PlaybackEvent::Started {
            position_ms: as_millis_u64(inner.position),
        });
        Ok(())
    }

    fn play(self: &Arc<Self>, inner: &mut ControllerInner) -> Result<()> {
        match inner.phase.clone() {
            PlaybackPhase::Playing => Ok(()),
            PlaybackPhase::Ready | PlaybackPhase::Paused if !inner.duration.is_zero() => {
                self.begin_playback(inner)
            }
            phase => {
                warn!(phase = %phase, "Play rejected");
                Err(PlaybackError::NotReady { phase })
            }
        }
    }

    fn pause(&self, inner: &mut ControllerInner) -> Result<()> {
        match inner.phase.clone() {
            PlaybackPhase::Playing => {}
            PlaybackPhase::Ready | PlaybackPhase::Paused => return Ok(()),
            phase => {
                warn!(phase = %phase, "Pause rejected");
                return Err(PlaybackError::NotReady { phase });
            }
        }

        let Some(player) = inner.player.clone() else {
            return Err(PlaybackError::NotReady {
                phase: inner.phase.clone(),
            });
        };

        inner.sampler.stop();
        if let Err(err) = player.pause() {
            let message = err.to_string();
            self.fail_playback(inner, message.clone());
            return Err(PlaybackError::PlaybackFailed(message));
        }

        if let Some(reading) = player.current_position() {
            inner.position = inner.position.max(reading.min(inner.duration));
        }
        inner.phase = PlaybackPhase::Paused;
        info!(position_ms = as_millis_u64(inner.position), "Playback paused");
        self.emit(PlaybackEvent::Paused {
            position_ms: as_millis_u64(inner.position),
        });
        Ok(())
    }

    /// Move to `Ended`. A second completion is a no-op.
    fn complete(&self, inner: &mut ControllerInner) {
        if inner.phase != PlaybackPhase::Playing {
            debug!(phase = %inner.phase, "Completion ignored");
            return;
        }

        inner.sampler.stop();
        inner.position = inner.duration;
        inner.phase = PlaybackPhase::Ended;
        info!(duration_ms = as_millis_u64(inner.duration), "Playback completed");
        self.emit(PlaybackEvent::Completed {
            duration_ms: as_millis_u64(inner.duration),
        });
    }

    /// Enter `Error` after a native failure, releasing the player.
    fn fail_playback(&self, inner: &mut ControllerInner, message: String) {
        error!(phase = %inner.phase, error = %message, "Playback failed");
        inner.release_player();
        inner.phase = PlaybackPhase::Error(message.clone());
        self.emit(PlaybackEvent::Error { message });
    }

    fn on_tick(weak: &Weak<Shared>, generation: u64) -> TickOutcome {
        let Some(shared) = weak.upgrade() else {
            return TickOutcome::Stop;
        };
        let mut guard = shared.inner.lock();
        let inner = &mut *guard;

        if inner.disposed
            || inner.sampler.generation() != generation
            || inner.phase != PlaybackPhase::Playing
        {
            return TickOutcome::Stop;
        }
        let Some(player) = inner.player.clone() else {
            return TickOutcome::Stop;
        };
        let Some(reading) = player.current_position() else {
            debug!("Position unavailable, skipping tick");
            return TickOutcome::Continue;
        };

        let duration = inner.duration;
        let position = reading.min(duration);

        // A looping player jumps back to the start instead of completing.
        let wrapped = shared.looping && position < inner.position;
        if wrapped {
            debug!(
                from_ms = as_millis_u64(inner.position),
                to_ms = as_millis_u64(position),
                "Playback looped"
            );
            inner.sampler.reset_baseline();
        }

        if (wrapped || position >= inner.position)
            && inner.sampler.observe(position) == Observation::Publish
        {
            inner.position = position;
            let snapshot = inner.snapshot();
            debug!(
                position_ms = as_millis_u64(position),
                duration_ms = as_millis_u64(duration),
                "Position published"
            );
            shared.emit(PlaybackEvent::PositionChanged {
                position_ms: as_millis_u64(position),
                duration_ms: as_millis_u64(duration),
                progress: snapshot.progress_fraction(),
            });
        }

        if !shared.looping && !duration.is_zero() && reading >= duration {
            shared.complete(inner);
            return TickOutcome::Stop;
        }

        TickOutcome::Continue
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.inner.get_mut().release_player();
    }
}

/// Retires a load whose future is dropped while the player prepares.
///
/// Disarmed as soon as `prepare` returns; the lock is taken only in `drop`.
struct PendingLoad<'a> {
    shared: &'a Shared,
    generation: u64,
    source: &'a str,
    armed: bool,
}

impl PendingLoad<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingLoad<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.shared.inner.lock();
        if inner.disposed || inner.load_generation != self.generation {
            return;
        }

        inner.release_player();
        inner.reset_media();
        inner.load_generation += 1;
        inner.phase = PlaybackPhase::Idle;
        warn!(source = %self.source, generation = self.generation, "Load cancelled");
        self.shared.emit(PlaybackEvent::LoadCancelled {
            source: self.source.to_string(),
        });
    }
}

/// Receives notifications from one prepared player.
struct ControllerObserver {
    shared: Weak<Shared>,
    load_generation: u64,
}

impl ControllerObserver {
    fn with_current<F>(&self, what: &str, f: F)
    where
        F: FnOnce(&Shared, &mut ControllerInner),
    {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut inner = shared.inner.lock();
        if inner.disposed || inner.load_generation != self.load_generation {
            warn!(
                notification = what,
                generation = self.load_generation,
                "Ignoring notification from a retired player"
            );
            return;
        }
        f(&shared, &mut *inner);
    }
}

impl PlayerObserver for ControllerObserver {
    fn on_complete(&self) {
        self.with_current("complete", |shared, inner| shared.complete(inner));
    }

    fn on_error(&self, message: String) {
        self.with_current("error", |shared, inner| {
            if matches!(
                inner.phase,
                PlaybackPhase::Ready | PlaybackPhase::Playing | PlaybackPhase::Paused
            ) {
                shared.fail_playback(inner, message);
            } else {
                warn!(phase = %inner.phase, error = %message, "Player error ignored");
            }
        });
    }
}

/// Playback state machine around a native player.
///
/// Cloning yields another handle to the same controller. The player is
/// released by [`dispose`](Self::dispose) or when the last handle is dropped.
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Shared>,
}

impl PlaybackController {
    /// Create an idle controller publishing on `events`.
    pub fn new(factory: Arc<dyn PlayerFactory>, config: &PlayerConfig, events: EventBus) -> Self {
        let inner = ControllerInner {
            phase: PlaybackPhase::Idle,
            duration: Duration::ZERO,
            position: Duration::ZERO,
            source_label: None,
            player: None,
            pending: None,
            sampler: ProgressSampler::new(config.sample_interval, config.position_granularity),
            load_generation: 0,
            disposed: false,
        };

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                factory,
                events,
                looping: config.looping,
            }),
        }
    }

    /// Create a controller with default configuration and its own event bus.
    pub fn with_defaults(factory: Arc<dyn PlayerFactory>) -> Self {
        let config = PlayerConfig::default();
        let events = EventBus::new(config.event_buffer_size);
        Self::new(factory, &config, events)
    }

    /// Event bus this controller publishes on.
    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.shared.events.subscribe()
    }

    /// Load and prepare a local file, replacing whatever was loaded.
    ///
    /// Accepted from every phase until the controller is disposed. Returns
    /// the prepared duration.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::LoadFailed`]: the player could not be created or
    ///   prepared; the controller is in `Error`.
    /// - [`PlaybackError::LoadSuperseded`]: a newer load (or a failure report)
    ///   replaced this one while it was preparing; its result was discarded.
    /// - [`PlaybackError::Disposed`]: the controller was disposed before or
    ///   during the load.
    ///
    /// Dropping the returned future before it completes releases the
    /// preparing player and returns the controller to `Idle`, unless a newer
    /// load already took over.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<Duration> {
        let path = path.as_ref().to_path_buf();
        let label = file_label(&path);

        let (player, generation) = {
            let mut inner = self.shared.inner.lock();
            if inner.disposed {
                return Err(PlaybackError::Disposed);
            }

            inner.release_player();
            inner.reset_media();
            inner.load_generation += 1;
            inner.phase = PlaybackPhase::Loading;
            let generation = inner.load_generation;

            info!(source = %label, generation, "Loading audio");
            self.shared.emit(PlaybackEvent::LoadStarted {
                source: label.clone(),
            });

            match self.shared.factory.create() {
                Ok(player) => {
                    let player = Arc::<dyn AudioPlayer>::from(player);
                    inner.pending = Some(player.clone());
                    (player, generation)
                }
                Err(err) => {
                    let message = err.to_string();
                    error!(source = %label, error = %message, "Player creation failed");
                    inner.phase = PlaybackPhase::Error(message.clone());
                    self.shared.emit(PlaybackEvent::Error {
                        message: message.clone(),
                    });
                    return Err(PlaybackError::LoadFailed(message));
                }
            }
        };

        let observer: Arc<dyn PlayerObserver> = Arc::new(ControllerObserver {
            shared: Arc::downgrade(&self.shared),
            load_generation: generation,
        });
        let request = PrepareRequest::new(path).with_looping(self.shared.looping);
        let mut pending = PendingLoad {
            shared: &self.shared,
            generation,
            source: &label,
            armed: true,
        };
        let prepared = player.prepare(request, observer).await;
        pending.disarm();
        drop(pending);

        // A retired load's player was already released by whoever retired it.
        let mut inner = self.shared.inner.lock();
        if inner.disposed {
            debug!(source = %label, "Prepare finished after dispose");
            return Err(PlaybackError::Disposed);
        }
        if inner.load_generation != generation {
            debug!(source = %label, generation, "Prepare result superseded");
            return Err(PlaybackError::LoadSuperseded);
        }
        inner.pending = None;

        match prepared {
            Ok(duration) => {
                inner.player = Some(player);
                inner.duration = duration;
                inner.position = Duration::ZERO;
                inner.source_label = Some(label.clone());
                inner.phase = PlaybackPhase::Ready;
                info!(
                    source = %label,
                    duration_ms = as_millis_u64(duration),
                    "Audio ready"
                );
                self.shared.emit(PlaybackEvent::Ready {
                    source: label,
                    duration_ms: as_millis_u64(duration),
                });
                Ok(duration)
            }
            Err(err) => {
                player.dispose();
                let message = err.to_string();
                error!(source = %label, error = %message, "Prepare failed");
                inner.phase = PlaybackPhase::Error(message.clone());
                self.shared.emit(PlaybackEvent::Error {
                    message: message.clone(),
                });
                Err(PlaybackError::LoadFailed(message))
            }
        }
    }

    /// Report that the source could not be obtained (e.g. download failed).
    ///
    /// Releases any player, supersedes an in-flight load and enters `Error`.
    pub fn fail_load(&self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        let mut inner = self.shared.inner.lock();
        if inner.disposed {
            return Err(PlaybackError::Disposed);
        }

        inner.release_player();
        inner.reset_media();
        inner.load_generation += 1;
        error!(error = %message, "Load failed");
        inner.phase = PlaybackPhase::Error(message.clone());
        self.shared.emit(PlaybackEvent::Error { message });
        Ok(())
    }

    /// Start or resume playback from `Ready` or `Paused`. No-op while playing.
    pub fn play(&self) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        if inner.disposed {
            return Err(PlaybackError::Disposed);
        }
        self.shared.play(&mut inner)
    }

    /// Pause playback. No-op from `Ready` or `Paused`.
    pub fn pause(&self) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        if inner.disposed {
            return Err(PlaybackError::Disposed);
        }
        self.shared.pause(&mut inner)
    }

    /// Pause when playing, play when ready or paused.
    pub fn toggle(&self) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        if inner.disposed {
            return Err(PlaybackError::Disposed);
        }
        match inner.phase.clone() {
            PlaybackPhase::Playing => self.shared.pause(&mut inner),
            PlaybackPhase::Ready | PlaybackPhase::Paused => self.shared.play(&mut inner),
            phase => Err(PlaybackError::NotReady { phase }),
        }
    }

    /// Move to `position` without changing phase.
    ///
    /// Rejected with [`PlaybackError::InvalidSeek`] when `position` exceeds
    /// the duration; nothing is sent to the player in that case.
    pub fn seek(&self, position: Duration) -> Result<()> {
        let mut guard = self.shared.inner.lock();
        let inner = &mut *guard;
        if inner.disposed {
            return Err(PlaybackError::Disposed);
        }
        if !inner.phase.controls_enabled() {
            warn!(phase = %inner.phase, "Seek rejected");
            return Err(PlaybackError::NotReady {
                phase: inner.phase.clone(),
            });
        }
        if position > inner.duration {
            warn!(
                requested_ms = as_millis_u64(position),
                duration_ms = as_millis_u64(inner.duration),
                "Seek out of range"
            );
            return Err(PlaybackError::InvalidSeek {
                requested: position,
                duration: inner.duration,
            });
        }
        let Some(player) = inner.player.clone() else {
            return Err(PlaybackError::NotReady {
                phase: inner.phase.clone(),
            });
        };

        if let Err(err) = player.seek_to(position) {
            let message = err.to_string();
            self.shared.fail_playback(inner, message.clone());
            return Err(PlaybackError::PlaybackFailed(message));
        }

        inner.position = position;
        inner.sampler.reset_baseline();
        debug!(position_ms = as_millis_u64(position), "Seeked");
        self.shared.emit(PlaybackEvent::Seeked {
            position_ms: as_millis_u64(position),
            duration_ms: as_millis_u64(inner.duration),
        });
        Ok(())
    }

    /// Restart from the beginning after playback ended.
    pub fn replay(&self) -> Result<()> {
        let mut guard = self.shared.inner.lock();
        let inner = &mut *guard;
        if inner.disposed {
            return Err(PlaybackError::Disposed);
        }
        if inner.phase != PlaybackPhase::Ended {
            return Err(PlaybackError::NotReady {
                phase: inner.phase.clone(),
            });
        }
        let Some(player) = inner.player.clone() else {
            return Err(PlaybackError::NotReady {
                phase: inner.phase.clone(),
            });
        };

        if let Err(err) = player.seek_to(Duration::ZERO) {
            let message = err.to_string();
            self.shared.fail_playback(inner, message.clone());
            return Err(PlaybackError::PlaybackFailed(message));
        }
        inner.position = Duration::ZERO;
        self.shared.emit(PlaybackEvent::Seeked {
            position_ms: 0,
            duration_ms: as_millis_u64(inner.duration),
        });
        self.shared.begin_playback(inner)
    }

    /// Tear down: stop sampling, release the player, return to `Idle`.
    ///
    /// Idempotent. After the first call every command is rejected with
    /// [`PlaybackError::Disposed`] and late player results are ignored.
    pub fn dispose(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.disposed {
            return;
        }

        inner.disposed = true;
        inner.release_player();
        inner.reset_media();
        inner.load_generation += 1;
        inner.phase = PlaybackPhase::Idle;
        info!("Player disposed");
        self.shared.emit(PlaybackEvent::Disposed);
    }

    /// Copy of the observable state.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.shared.inner.lock().snapshot()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.shared.inner.lock().phase.clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.inner.lock().disposed
    }

    /// Whether a sampling task is running.
    pub fn is_sampling(&self) -> bool {
        self.shared.inner.lock().sampler.is_active()
    }

    /// Whether a player handle is held.
    pub fn has_player(&self) -> bool {
        self.shared.inner.lock().player.is_some()
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("PlaybackController")
            .field("phase", &inner.phase)
            .field("duration", &inner.duration)
            .field("position", &inner.position)
            .field("sampler", &inner.sampler)
            .field("disposed", &inner.disposed)
            .finish()
    }
}
