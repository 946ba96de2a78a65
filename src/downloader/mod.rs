//! Media download over HTTP with bounded time and size.
//!
//! Failures are first-class results: any non-2xx status, transport error,
//! timeout or size overflow yields a [`FetchFailure`] the caller must
//! handle. Nothing at this layer retries or raises.

use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;

use crate::config::InlinerConfig;

/// A failed media download, naming the exact URL and the reason.
#[derive(Debug, Clone, Error)]
#[error("failed to download {url}: {reason}")]
pub struct FetchFailure {
    pub url: String,
    pub reason: String,
}

/// Downloads media bytes with a per-request timeout and a size cap.
#[derive(Debug, Clone)]
pub struct MediaDownloader {
    client: Client,
    config: InlinerConfig,
}

impl MediaDownloader {
    #[must_use]
    pub fn new(config: InlinerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Retrieve the bytes behind `url`.
    ///
    /// The response body is streamed and the configured size cap enforced
    /// both against `Content-Length` and during accumulation, so an
    /// oversized or lying server cannot balloon memory.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        let failure = |reason: String| FetchFailure {
            url: url.to_string(),
            reason,
        };
        let max_size = self.config.max_media_size();

        let response = self
            .client
            .get(url)
            .timeout(self.config.download_timeout())
            .header("User-Agent", self.config.user_agent())
            .header("Accept", "image/*,video/*,audio/*,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failure(format!("unexpected status {}", response.status())));
        }

        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > max_size as u64 {
            return Err(failure(format!(
                "media too large: {expected_size} bytes exceeds limit of {max_size} bytes"
            )));
        }

        let mut buffer = if expected_size > 0 {
            Vec::with_capacity(expected_size as usize)
        } else {
            Vec::new()
        };

        let mut stream = response.bytes_stream();
        let mut total_size = 0;

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| failure(e.to_string()))?;

            let new_total = total_size + chunk.len();
            if new_total > max_size {
                return Err(failure(format!(
                    "media exceeded size limit during download: {new_total} bytes (max: {max_size})"
                )));
            }

            buffer.extend_from_slice(&chunk);
            total_size = new_total;
        }

        Ok(buffer)
    }
}
