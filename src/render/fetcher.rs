//! Best-effort image download

use crate::error::{Error, Result};
use futures_util::StreamExt;
use std::path::Path;
use std::time::Duration;

/// Result of a single download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Image written to the destination
    Saved { bytes: u64 },
    /// Download failed; nothing is left at the destination
    Failed { reason: String },
}

impl FetchOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, FetchOutcome::Saved { .. })
    }
}

/// Default cap on a single image download (100 MiB)
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Downloads images to local files
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    max_download_bytes: u64,
}

impl ImageFetcher {
    /// Create a fetcher. `None` applies no timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(Error::HttpRequest)?;
        Ok(Self::with_client(client))
    }

    /// Create a fetcher with a preconfigured HTTP client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
        }
    }

    /// Cap the size of each download; larger bodies count as failed fetches
    pub fn with_max_download_bytes(mut self, max_download_bytes: u64) -> Self {
        self.max_download_bytes = max_download_bytes;
        self
    }

    /// Download `url` into `destination`, overwriting it.
    ///
    /// Network failures and non-success statuses do not return an error: they
    /// are logged and reported as [`FetchOutcome::Failed`], and any stale file at
    /// `destination` is removed. Only local write failures are errors.
    pub async fn fetch(&self, url: &str, destination: &Path) -> Result<FetchOutcome> {
        tracing::debug!(url, path = %destination.display(), "Downloading image");

        match self.download(url).await {
            Ok(data) => {
                tokio::fs::write(destination, &data).await?;
                tracing::debug!(path = %destination.display(), bytes = data.len(), "Downloaded image");
                Ok(FetchOutcome::Saved {
                    bytes: data.len() as u64,
                })
            }
            Err(reason) => {
                tracing::error!(url, %reason, "Failed to download image");
                match tokio::fs::remove_file(destination).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(Error::Io(e)),
                }
                Ok(FetchOutcome::Failed { reason })
            }
        }
    }

    async fn download(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("HTTP status {}", response.status()));
        }

        let max_size = self.max_download_bytes;
        let too_large = |size: u64| Error::DownloadTooLarge { size, max_size }.to_string();

        if let Some(content_length) = response.content_length() {
            if content_length > max_size {
                return Err(too_large(content_length));
            }
        }

        let mut data = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| format!("body read failed: {}", e))?;
            data.extend_from_slice(&chunk);
            if data.len() as u64 > max_size {
                return Err(too_large(data.len() as u64));
            }
        }

        Ok(data)
    }
}
