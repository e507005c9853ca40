//! # Event Bus System
//!
//! Broadcasts playback and source-resolution notifications to any number of
//! observers (view models, host bindings, diagnostics) through a
//! `broadcast` channel from `core_async::sync`.
//!
//! ## Overview
//!
//! - **Event Types**: [`CoreEvent`] wraps [`PlaybackEvent`] and [`SourceEvent`]
//! - **EventBus**: cloneable publisher handle
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐   emit    ┌───────────┐  subscribe  ┌────────────┐
//! │ PlaybackController ├──────────>│           ├────────────>│ PlayerView │
//! └────────────────────┘           │ EventBus  │             └────────────┘
//! ┌────────────────────┐   emit    │           │  subscribe  ┌────────────┐
//! │ AudioPlayerService ├──────────>│           ├────────────>│    Host    │
//! └────────────────────┘           └───────────┘             └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # core_async::runtime::block_on(async {
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::Started { position_ms: 0 }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Playback started");
//! # });
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Position
//!   updates are frequent; lagging subscribers should read a fresh snapshot
//!   instead of replaying.
//! - **`RecvError::Closed`**: every publisher was dropped.
//!
//! `emit` fails only when nobody is subscribed; publishers ignore that case.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback state machine notifications
    Playback(PlaybackEvent),
    /// Remote source resolution notifications
    Source(SourceEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Source(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Source(SourceEvent::ResolveFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::LoadCancelled { .. }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::PositionChanged { .. }) => EventSeverity::Debug,
            CoreEvent::Source(SourceEvent::Resolving { .. }) => EventSeverity::Debug,
            _ => EventSeverity::Info,
        }
    }
}

impl From<PlaybackEvent> for CoreEvent {
    fn from(event: PlaybackEvent) -> Self {
        CoreEvent::Playback(event)
    }
}

impl From<SourceEvent> for CoreEvent {
    fn from(event: SourceEvent) -> Self {
        CoreEvent::Source(event)
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Transitions and progress of the playback controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A new file is being prepared.
    LoadStarted {
        /// Display label of the file.
        source: String,
    },
    /// The caller stopped waiting for a load; its player was released.
    LoadCancelled {
        /// Display label of the file.
        source: String,
    },
    /// The file was prepared and is ready to play.
    Ready {
        /// Display label of the file.
        source: String,
        /// Total duration (milliseconds).
        duration_ms: u64,
    },
    /// Playback started or resumed.
    Started {
        /// Position at which playback started (milliseconds).
        position_ms: u64,
    },
    /// Playback paused.
    Paused {
        /// Position when paused (milliseconds).
        position_ms: u64,
    },
    /// An accepted seek moved the position.
    Seeked {
        /// New position (milliseconds).
        position_ms: u64,
        /// Track duration (milliseconds).
        duration_ms: u64,
    },
    /// The sampler published a new position.
    PositionChanged {
        /// New position (milliseconds).
        position_ms: u64,
        /// Track duration (milliseconds).
        duration_ms: u64,
        /// `position / duration` clamped to `[0, 1]`.
        progress: f64,
    },
    /// Playback reached the end of the file.
    Completed {
        /// Track duration (milliseconds).
        duration_ms: u64,
    },
    /// Loading or playback failed.
    Error {
        /// Human-readable error message.
        message: String,
    },
    /// The controller was torn down.
    Disposed,
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::LoadStarted { .. } => "Loading audio",
            PlaybackEvent::LoadCancelled { .. } => "Audio load cancelled",
            PlaybackEvent::Ready { .. } => "Audio ready",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Seeked { .. } => "Playback position moved",
            PlaybackEvent::PositionChanged { .. } => "Playback position changed",
            PlaybackEvent::Completed { .. } => "Playback completed",
            PlaybackEvent::Error { .. } => "Playback error",
            PlaybackEvent::Disposed => "Player disposed",
        }
    }
}

// ============================================================================
// Source Events
// ============================================================================

/// Progress of turning a remote reference into a local file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SourceEvent {
    /// Resolution started.
    Resolving {
        /// The reference being resolved, with secrets redacted.
        reference: String,
    },
    /// The reference is available locally.
    Resolved {
        /// The reference that was resolved, with secrets redacted.
        reference: String,
        /// Display label of the local file.
        label: String,
    },
    /// Resolution failed.
    ResolveFailed {
        /// The reference that failed, with secrets redacted.
        reference: String,
        /// Human-readable error message.
        message: String,
    },
}

impl SourceEvent {
    fn description(&self) -> &str {
        match self {
            SourceEvent::Resolving { .. } => "Resolving audio source",
            SourceEvent::Resolved { .. } => "Audio source resolved",
            SourceEvent::ResolveFailed { .. } => "Audio source resolution failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Clones share the same channel. Each `subscribe()` creates an independent
/// receiver that sees every event emitted after it was created.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// Subscribers that fall behind by more than `capacity` events receive
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(100);
/// let source_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Source(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events that match `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every matching event currently buffered.
    ///
    /// Lag notifications are skipped; the stream resumes at the oldest event
    /// still retained.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        loop {
            match self.try_recv() {
                Some(Ok(event)) => events.push(event),
                Some(Err(RecvError::Lagged(_))) => continue,
                Some(Err(RecvError::Closed)) | None => return events,
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
