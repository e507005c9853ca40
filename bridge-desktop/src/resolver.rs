//! Source resolution using Reqwest and Tokio file I/O

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    source::{file_name_from_url, ResolvedSource, SourceResolver},
};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// File name used when a URL has no usable last path segment.
pub const FALLBACK_FILE_NAME: &str = "downloaded_file";

/// Resolves references to local files.
///
/// - `http://` and `https://` URLs are downloaded into the cache directory,
///   named after the last URL path segment. An existing file with the same
///   name is overwritten.
/// - `file://` URIs and plain paths are checked for existence and returned
///   as-is.
pub struct TokioSourceResolver {
    client: Client,
    cache_dir: PathBuf,
}

impl TokioSourceResolver {
    /// Create a resolver that downloads into `cache_dir`.
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self::with_timeout(cache_dir, Duration::from_secs(60))
    }

    /// Create a resolver using the platform cache directory.
    pub fn with_default_cache() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("audio-player-core");
        Self::new(cache_dir)
    }

    /// Create a resolver with a custom download timeout.
    pub fn with_timeout(cache_dir: impl AsRef<Path>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("audio-player-core/0.1.0")
            .build()
            .unwrap_or_default();

        Self::with_client(client, cache_dir)
    }

    /// Create a resolver with a preconfigured client.
    pub fn with_client(client: Client, cache_dir: impl AsRef<Path>) -> Self {
        Self {
            client,
            cache_dir: cache_dir.as_ref().to_path_buf(),
        }
    }

    /// Directory downloads are written to.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn download_error(url: &str) -> BridgeError {
        BridgeError::OperationFailed(format!("Failed to download file from URL: {}", url))
    }

    async fn download(&self, url: Url) -> Result<ResolvedSource> {
        let file_name = file_name_from_url(url.as_str(), FALLBACK_FILE_NAME);
        let target = self.cache_dir.join(&file_name);

        debug!(file = %file_name, "Downloading audio file");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(error = %e, "Download request failed");
            Self::download_error(url.as_str())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Download returned error status");
            return Err(Self::download_error(url.as_str()));
        }

        fs::create_dir_all(&self.cache_dir).await?;
        let mut file = fs::File::create(&target).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                warn!(error = %e, bytes = written, "Download interrupted");
                Self::download_error(url.as_str())
            })?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        info!(file = %file_name, bytes = written, "Audio file downloaded");

        let modified = modified_time(&target).await;
        Ok(ResolvedSource::from_path(target).with_last_modified(modified))
    }

    async fn local(&self, path: PathBuf) -> Result<ResolvedSource> {
        let metadata = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BridgeError::NotAvailable(format!("Audio file not found: {}", path.display()))
            } else {
                BridgeError::Io(e)
            }
        })?;

        if !metadata.is_file() {
            return Err(BridgeError::OperationFailed(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
        Ok(ResolvedSource::from_path(path).with_last_modified(modified))
    }
}

impl Default for TokioSourceResolver {
    fn default() -> Self {
        Self::with_default_cache()
    }
}

async fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = fs::metadata(path).await.ok()?;
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

/// What a reference points at once parsed.
#[derive(Debug, PartialEq)]
enum Reference {
    Remote(Url),
    Local(PathBuf),
}

/// Classify a reference. Anything that does not parse as an `http`,
/// `https` or `file` URL (including Windows drive paths) is a plain path.
fn classify(reference: &str) -> Result<Reference> {
    match Url::parse(reference) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Reference::Remote(url)),
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map(Reference::Local)
            .map_err(|_| {
                BridgeError::OperationFailed(format!("Invalid file URI: {}", reference))
            }),
        _ => Ok(Reference::Local(PathBuf::from(reference))),
    }
}

#[async_trait]
impl SourceResolver for TokioSourceResolver {
    async fn resolve(&self, reference: &str) -> Result<ResolvedSource> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(BridgeError::OperationFailed(
                "Empty audio reference".to_string(),
            ));
        }

        match classify(reference)? {
            Reference::Remote(url) => self.download(url).await,
            Reference::Local(path) => self.local(path).await,
        }
    }
}
