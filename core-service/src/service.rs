use crate::error::{CoreError, Result};
use crate::view::PlayerView;
use bridge_traits::SourceResolver;
use chrono::{DateTime, Utc};
use core_async::time::as_millis_u64;
use core_playback::{PlaybackController, PlaybackError, PlaybackPhase, PlaybackSnapshot};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, Receiver, SourceEvent};
use core_runtime::logging::{redact_url, strip_path};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct SourceState {
    /// Bumped by every `load` and by `dispose`.
    request: u64,
    resolving: bool,
    last_modified: Option<DateTime<Utc>>,
}

/// Clears the resolving flag if a `load` is dropped mid-resolution.
struct ResolveGuard<'a> {
    source: &'a Mutex<SourceState>,
    request: u64,
    armed: bool,
}

impl Drop for ResolveGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut source = self.source.lock();
        if source.request == self.request {
            source.resolving = false;
            warn!(request = self.request, "Resolution cancelled");
        }
    }
}

/// Host-facing audio player: resolves a reference, loads it and exposes
/// transport controls plus a renderable view.
///
/// Cloning yields another handle to the same player.
#[derive(Clone)]
pub struct AudioPlayerService {
    controller: PlaybackController,
    resolver: Arc<dyn SourceResolver>,
    events: EventBus,
    source: Arc<Mutex<SourceState>>,
}

impl AudioPlayerService {
    /// Create a service from a validated configuration.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.player.event_buffer_size);
        let controller =
            PlaybackController::new(config.player_factory.clone(), &config.player, events.clone());

        info!(
            cache_dir = %config.cache_dir.display(),
            sample_interval_ms = as_millis_u64(config.player.sample_interval),
            "Audio player service created"
        );

        Ok(Self {
            controller,
            resolver: config.source_resolver,
            events,
            source: Arc::new(Mutex::new(SourceState::default())),
        })
    }

    /// Resolve `reference` (URL, `file://` URI or path) to a local file and
    /// prepare it, replacing whatever was loaded. Returns the duration.
    ///
    /// A resolution failure puts the player in its error phase with the
    /// message `Failed to download file from URL: <reference>`.
    pub async fn load(&self, reference: &str) -> Result<Duration> {
        if self.controller.is_disposed() {
            return Err(PlaybackError::Disposed.into());
        }

        let shown = redact_url(reference);
        let request = {
            let mut source = self.source.lock();
            source.request += 1;
            source.resolving = true;
            source.last_modified = None;
            source.request
        };
        info!(reference = %shown, "Resolving audio source");
        self.emit(SourceEvent::Resolving {
            reference: shown.clone(),
        });

        let mut guard = ResolveGuard {
            source: &self.source,
            request,
            armed: true,
        };
        let resolved = self.resolver.resolve(reference).await;
        guard.armed = false;
        drop(guard);

        {
            let mut source = self.source.lock();
            if source.request != request {
                if self.controller.is_disposed() {
                    return Err(PlaybackError::Disposed.into());
                }
                warn!(reference = %shown, "Resolution superseded");
                return Err(PlaybackError::LoadSuperseded.into());
            }
            source.resolving = false;
            if let Ok(resolved) = &resolved {
                source.last_modified = resolved.last_modified;
            }
        }

        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(err) => {
                let message = format!("Failed to download file from URL: {}", shown);
                error!(reference = %shown, error = %err, "Source resolution failed");
                self.emit(SourceEvent::ResolveFailed {
                    reference: shown,
                    message: err.to_string(),
                });
                self.controller.fail_load(message.clone())?;
                return Err(PlaybackError::LoadFailed(message).into());
            }
        };

        info!(
            reference = %shown,
            file = strip_path(&resolved.path.to_string_lossy()),
            "Audio source resolved"
        );
        self.emit(SourceEvent::Resolved {
            reference: shown,
            label: resolved.label.clone(),
        });

        Ok(self.controller.load(&resolved.path).await?)
    }

    /// Play/pause button: pauses while playing, plays when ready or paused,
    /// and restarts from the beginning once playback ended.
    pub fn toggle_play(&self) -> Result<()> {
        if self.source.lock().resolving {
            warn!("Toggle ignored while resolving");
            return Err(PlaybackError::NotReady {
                phase: PlaybackPhase::Loading,
            }
            .into());
        }
        match self.controller.phase() {
            PlaybackPhase::Ended => self.controller.replay()?,
            _ => self.controller.toggle()?,
        }
        Ok(())
    }

    pub fn play(&self) -> Result<()> {
        Ok(self.controller.play()?)
    }

    pub fn pause(&self) -> Result<()> {
        Ok(self.controller.pause()?)
    }

    /// Seek to `seconds` from the start.
    ///
    /// Negative and non-finite targets are rejected before reaching the
    /// controller; targets beyond the duration are rejected by it.
    pub fn seek(&self, seconds: f64) -> Result<()> {
        let target = Duration::try_from_secs_f64(seconds)
            .map_err(|_| CoreError::InvalidInput(format!("seek target {seconds}s")))?;
        Ok(self.controller.seek(target)?)
    }

    /// Restart from the beginning after playback ended.
    pub fn replay(&self) -> Result<()> {
        Ok(self.controller.replay()?)
    }

    /// Release the player and stop sampling. Idempotent; pending resolutions
    /// are discarded when they finish.
    pub fn dispose(&self) {
        {
            let mut source = self.source.lock();
            source.request += 1;
            source.resolving = false;
            source.last_modified = None;
        }
        self.controller.dispose();
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.controller.snapshot()
    }

    /// Whether a source is currently being resolved.
    pub fn is_resolving(&self) -> bool {
        self.source.lock().resolving
    }

    /// Current presentation state.
    pub fn view(&self) -> PlayerView {
        let (resolving, last_modified) = {
            let source = self.source.lock();
            (source.resolving, source.last_modified)
        };
        PlayerView::new(&self.controller.snapshot(), resolving, last_modified)
    }

    /// Subscribe to playback and source events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    fn emit(&self, event: SourceEvent) {
        self.events.emit(CoreEvent::Source(event)).ok();
    }
}

impl std::fmt::Debug for AudioPlayerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioPlayerService")
            .field("controller", &self.controller)
            .field("resolving", &self.is_resolving())
            .finish()
    }
}
