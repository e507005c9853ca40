//! Observable playback state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Discrete phase of the playback state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "message")]
pub enum PlaybackPhase {
    /// Nothing loaded, or the controller was disposed.
    Idle,
    /// A file is being prepared.
    Loading,
    /// Prepared and paused at the start.
    Ready,
    Playing,
    Paused,
    /// Reached the end of the file.
    Ended,
    /// Loading or playback failed; carries a human-readable message.
    Error(String),
}

impl PlaybackPhase {
    /// Name of the phase without its payload.
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackPhase::Idle => "Idle",
            PlaybackPhase::Loading => "Loading",
            PlaybackPhase::Ready => "Ready",
            PlaybackPhase::Playing => "Playing",
            PlaybackPhase::Paused => "Paused",
            PlaybackPhase::Ended => "Ended",
            PlaybackPhase::Error(_) => "Error",
        }
    }

    /// Phases in which play/pause/seek are meaningful.
    pub fn controls_enabled(&self) -> bool {
        matches!(
            self,
            PlaybackPhase::Ready | PlaybackPhase::Playing | PlaybackPhase::Paused
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlaybackPhase::Error(_))
    }

    /// Error message, if the phase is `Error`.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            PlaybackPhase::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Point-in-time copy of the controller's observable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub duration: Duration,
    pub position: Duration,
    /// Display label of the loaded file.
    pub source_label: Option<String>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            duration: Duration::ZERO,
            position: Duration::ZERO,
            source_label: None,
        }
    }
}

impl PlaybackSnapshot {
    /// `position / duration`, clamped to `[0, 1]`; 0 while no duration is known.
    pub fn progress_fraction(&self) -> f64 {
        progress_fraction(self.position, self.duration)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.phase == PlaybackPhase::Loading
    }

    pub fn controls_enabled(&self) -> bool {
        self.phase.controls_enabled()
    }
}

/// `position / duration` clamped to `[0, 1]`.
pub fn progress_fraction(position: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    (position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_enabled_only_when_live() {
        assert!(PlaybackPhase::Ready.controls_enabled());
        assert!(PlaybackPhase::Playing.controls_enabled());
        assert!(PlaybackPhase::Paused.controls_enabled());
        assert!(!PlaybackPhase::Loading.controls_enabled());
        assert!(!PlaybackPhase::Ended.controls_enabled());
        assert!(!PlaybackPhase::Error("boom".into()).controls_enabled());
    }

    #[test]
    fn test_progress_is_clamped() {
        let d = Duration::from_secs(180);
        assert_eq!(progress_fraction(Duration::ZERO, Duration::ZERO), 0.0);
        assert_eq!(progress_fraction(Duration::from_secs(90), d), 0.5);
        assert_eq!(progress_fraction(Duration::from_secs(200), d), 1.0);
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&PlaybackPhase::Error("boom".into())).unwrap();
        assert_eq!(json, r#"{"phase":"Error","message":"boom"}"#);
        let json = serde_json::to_string(&PlaybackPhase::Playing).unwrap();
        assert_eq!(json, r#"{"phase":"Playing"}"#);
    }
}
