use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::error::{GalleryError, Result};

/// Fetches media bytes from remote urls or local paths
#[derive(Debug, Clone)]
pub struct MediaClient {
    http: reqwest::Client,
}

impl MediaClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("media-gallery/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Read the bytes behind `url`
    ///
    /// `http(s)://` goes over the network, `file://` urls and bare paths are
    /// read from disk.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        match local_path(url) {
            Some(path) => {
                debug!(path = %path.display(), "reading local media");
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| GalleryError::io(path, e))
            }
            None => {
                debug!(url, "downloading media");
                let response = self.http.get(url).send().await?.error_for_status()?;
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

/// Local filesystem path for a media url, `None` for remote urls
pub fn local_path(url: &str) -> Option<PathBuf> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return None;
    }
    Some(PathBuf::from(url.strip_prefix("file://").unwrap_or(url)))
}
