//! Source resolution bridge.
//!
//! Players only accept local files. A [`SourceResolver`] turns whatever the
//! host was given (a remote URL, a `file://` URI, a plain path) into a local
//! file the engine can prepare, downloading it first when needed.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use url::Url;

use crate::{error::Result, platform::PlatformSendSync};

/// A source that is ready to be handed to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Local path of the audio file.
    pub path: PathBuf,
    /// Display name (usually the file name).
    pub label: String,
    /// Last modification time of the local file, when known.
    pub last_modified: Option<DateTime<Utc>>,
}

impl ResolvedSource {
    /// Build a resolved source whose label is the file name of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = file_label(&path);
        Self {
            path,
            label,
            last_modified: None,
        }
    }

    /// Attach a modification timestamp.
    pub fn with_last_modified(mut self, modified: Option<DateTime<Utc>>) -> Self {
        self.last_modified = modified;
        self
    }
}

/// Derive a display label from a path, falling back to the full path.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Derive a local file name from the last path segment of a URL.
///
/// The segment is percent-decoded. Unparsable URLs, empty segments and
/// names that would escape the cache directory (`.`, `..`, separators)
/// yield `fallback`.
pub fn file_name_from_url(url: &str, fallback: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return fallback.to_string();
    };
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| urlencoding::decode(segment).ok())
        .map(|name| name.into_owned())
        .filter(|name| is_plain_file_name(name))
        .unwrap_or_else(|| fallback.to_string())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

/// Resolves a remote or local reference to a playable local file.
#[async_trait::async_trait]
pub trait SourceResolver: PlatformSendSync {
    /// Resolve `reference` to a local file, downloading it if necessary.
    async fn resolve(&self, reference: &str) -> Result<ResolvedSource>;
}
