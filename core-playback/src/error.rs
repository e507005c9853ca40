//! # Playback Error Types
//!
//! Errors returned by [`PlaybackController`](crate::PlaybackController)
//! commands.
//!
//! Two families exist. Rejections (`NotReady`, `InvalidSeek`, `Disposed`,
//! `LoadSuperseded`) are local guard failures: the command was refused and
//! the controller state is exactly what it was before the call. Failures
//! (`LoadFailed`, `PlaybackFailed`) moved the controller into its error
//! phase.

use crate::state::PlaybackPhase;
use bridge_traits::BridgeError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Failures (controller moved to Error)
    // ========================================================================
    /// Resolving, creating or preparing the source failed.
    #[error("Failed to load audio: {0}")]
    LoadFailed(String),

    /// The engine failed while a file was loaded.
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    // ========================================================================
    // Rejections (state unchanged)
    // ========================================================================
    /// Seek target outside `[0, duration]`.
    #[error("Seek to {requested:?} rejected: duration is {duration:?}")]
    InvalidSeek {
        requested: Duration,
        duration: Duration,
    },

    /// The command is not valid in the current phase.
    #[error("Command not allowed while {phase}")]
    NotReady { phase: PlaybackPhase },

    /// The controller was disposed and accepts no further commands.
    #[error("Player has been disposed")]
    Disposed,

    /// A newer `load` replaced this one before it finished preparing.
    #[error("Load superseded by a newer request")]
    LoadSuperseded,

    // ========================================================================
    // Environment
    // ========================================================================
    /// Progress sampling needs a running async runtime.
    #[error("No async runtime available to drive progress sampling")]
    RuntimeUnavailable,

    /// Error reported by the host bridge.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    /// Returns `true` if the command was refused without touching state.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PlaybackError::InvalidSeek { .. }
                | PlaybackError::NotReady { .. }
                | PlaybackError::Disposed
                | PlaybackError::LoadSuperseded
        )
    }

    /// Returns `true` if the error ended the current load; only a new `load`
    /// recovers.
    pub fn is_terminal_for_load(&self) -> bool {
        matches!(
            self,
            PlaybackError::LoadFailed(_) | PlaybackError::PlaybackFailed(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let seek = PlaybackError::InvalidSeek {
            requested: Duration::from_secs(200),
            duration: Duration::from_secs(180),
        };
        assert!(seek.is_rejection());
        assert!(!seek.is_terminal_for_load());

        let load = PlaybackError::LoadFailed("no such file".into());
        assert!(load.is_terminal_for_load());
        assert!(!load.is_rejection());

        assert!(PlaybackError::Disposed.is_rejection());
        assert!(!PlaybackError::RuntimeUnavailable.is_rejection());
    }

    #[test]
    fn test_messages() {
        let err = PlaybackError::NotReady {
            phase: PlaybackPhase::Loading,
        };
        assert_eq!(err.to_string(), "Command not allowed while Loading");

        let err: PlaybackError = BridgeError::Player("decoder crashed".into()).into();
        assert!(err.to_string().contains("decoder crashed"));
    }
}
