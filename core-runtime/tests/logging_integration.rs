//! Integration tests for logging system

use bridge_traits::LogLevel;
use core_runtime::logging::{init_logging, redact_url, strip_path, LogFormat, LoggingConfig};

#[test]
fn test_second_initialization_is_rejected() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    // Another test binary may not have installed a subscriber yet; only the
    // second call is guaranteed to fail.
    let _ = init_logging(config.clone());
    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("Logging setup failed: subscriber could not be installed"));
}

#[test]
fn test_invalid_filter_is_rejected() {
    let config = LoggingConfig::default().with_filter("core_playback=nope");
    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("invalid filter directive"));
}

#[test]
fn test_signed_urls_are_redacted() {
    let url = "https://storage.example.com/bucket/memo.m4a?X-Goog-Signature=deadbeef";
    let redacted = redact_url(url);
    assert!(!redacted.contains("deadbeef"));
    assert!(redacted.starts_with("https://storage.example.com/bucket/memo.m4a"));
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/data/user/0/app/cache/memo.m4a"), "memo.m4a");
    assert_eq!(strip_path("C:\\Users\\John\\Music\\song.mp3"), "song.mp3");
    assert_eq!(strip_path("filename.txt"), "filename.txt");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}
