//! Presentation state derived from a playback snapshot.
//!
//! [`PlayerView`] is what a host renders: labels, clock strings and control
//! enablement. It is recomputed from scratch on every read and holds no state
//! of its own.

use chrono::{DateTime, Utc};
use core_playback::{PlaybackPhase, PlaybackSnapshot};
use serde::Serialize;

/// Label shown while a source is being resolved or prepared.
pub const LOADING_LABEL: &str = "Loading audio...";

/// Label shown when loading or playback failed.
pub const ERROR_LABEL: &str = "Error: Cannot load audio.";

/// Date line shown when no file has been resolved.
pub const NO_AUDIO_DATE: &str = "No audio...";

/// `strftime` pattern for the file date line.
pub const FILE_DATE_FORMAT: &str = "%d %b %Y, %H:%M";

/// Everything a player widget needs to draw itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    /// Play/pause and the seek bar accept input.
    pub controls_enabled: bool,
    /// Playback ended; the play button restarts from the beginning.
    pub can_replay: bool,
    pub is_loading: bool,
    pub is_playing: bool,
    pub file_label: String,
    /// Current time while playing or once moved off zero, total otherwise.
    pub displayed_time: String,
    pub formatted_duration: String,
    /// Slider value in whole seconds.
    pub progress_value: u64,
    /// Slider maximum in whole seconds.
    pub progress_max: u64,
    pub progress_fraction: f64,
    pub file_date: String,
}

impl PlayerView {
    pub fn new(
        snapshot: &PlaybackSnapshot,
        resolving: bool,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        let is_loading = resolving || snapshot.is_loading();
        let is_playing = !resolving && snapshot.is_playing();

        let file_label = if is_loading {
            LOADING_LABEL.to_string()
        } else if snapshot.phase.is_error() {
            ERROR_LABEL.to_string()
        } else {
            snapshot.source_label.clone().unwrap_or_default()
        };

        let position_secs = snapshot.position.as_secs();
        let duration_secs = snapshot.duration.as_secs();
        let formatted_duration = format_clock(duration_secs);
        let displayed_time = if is_playing || !snapshot.position.is_zero() {
            format_clock(position_secs)
        } else {
            formatted_duration.clone()
        };

        Self {
            controls_enabled: !resolving && snapshot.controls_enabled(),
            can_replay: !resolving && snapshot.phase == PlaybackPhase::Ended,
            is_loading,
            is_playing,
            file_label,
            displayed_time,
            formatted_duration,
            progress_value: position_secs,
            progress_max: duration_secs,
            progress_fraction: snapshot.progress_fraction(),
            file_date: format_file_date(last_modified),
        }
    }
}

/// Render whole seconds as zero-padded `mm:ss`. Minutes are not wrapped
/// into hours.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Render a modification time for the date line.
pub fn format_file_date(modified: Option<DateTime<Utc>>) -> String {
    match modified {
        Some(date) => date.format(FILE_DATE_FORMAT).to_string(),
        None => NO_AUDIO_DATE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    fn snapshot(phase: PlaybackPhase, position: u64, duration: u64) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase,
            duration: Duration::from_secs(duration),
            position: Duration::from_secs(position),
            source_label: Some("clip.mp3".to_string()),
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(180), "03:00");
        assert_eq!(format_clock(3_725), "62:05");
    }

    #[test]
    fn test_file_date() {
        assert_eq!(format_file_date(None), "No audio...");
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(format_file_date(Some(date)), "09 Mar 2024, 14:05");
    }

    #[test]
    fn test_ready_shows_total_duration() {
        let view = PlayerView::new(&snapshot(PlaybackPhase::Ready, 0, 180), false, None);
        assert!(view.controls_enabled);
        assert!(!view.is_playing);
        assert_eq!(view.file_label, "clip.mp3");
        assert_eq!(view.displayed_time, "03:00");
        assert_eq!(view.progress_max, 180);
        assert_eq!(view.file_date, NO_AUDIO_DATE);
    }

    #[test]
    fn test_playing_shows_current_time() {
        let view = PlayerView::new(&snapshot(PlaybackPhase::Playing, 0, 180), false, None);
        assert_eq!(view.displayed_time, "00:00");

        let view = PlayerView::new(&snapshot(PlaybackPhase::Paused, 75, 180), false, None);
        assert_eq!(view.displayed_time, "01:15");
        assert_eq!(view.progress_value, 75);
        assert_eq!(view.formatted_duration, "03:00");
    }

    #[test]
    fn test_loading_and_error_labels() {
        let view = PlayerView::new(&snapshot(PlaybackPhase::Ready, 0, 180), true, None);
        assert_eq!(view.file_label, LOADING_LABEL);
        assert!(view.is_loading);
        assert!(!view.controls_enabled);

        let view = PlayerView::new(
            &snapshot(PlaybackPhase::Error("boom".into()), 0, 0),
            false,
            None,
        );
        assert_eq!(view.file_label, ERROR_LABEL);
        assert!(!view.controls_enabled);
        assert!(!view.is_loading);
    }

    #[test]
    fn test_ended_offers_replay() {
        let view = PlayerView::new(&snapshot(PlaybackPhase::Ended, 180, 180), false, None);
        assert!(view.can_replay);
        assert!(!view.controls_enabled);
        assert_eq!(view.progress_fraction, 1.0);
        assert_eq!(view.displayed_time, "03:00");
    }
}
