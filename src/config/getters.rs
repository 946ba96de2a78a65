//! Read accessors for `InlinerConfig`.

use std::time::Duration;

use super::types::InlinerConfig;

impl InlinerConfig {
    /// Timeout for a single media download.
    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Maximum size in bytes for a single downloaded media file.
    #[must_use]
    pub fn max_media_size(&self) -> usize {
        self.max_media_size
    }

    /// Cap on concurrent outbound media downloads within one run.
    #[must_use]
    pub fn max_concurrent_downloads(&self) -> usize {
        self.max_concurrent_downloads
    }

    /// Entities fetched per page when iterating a content collection.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Portable placeholder prefix for rewritten references.
    #[must_use]
    pub fn site_url_placeholder(&self) -> &str {
        &self.site_url_placeholder
    }

    /// User agent sent with media downloads.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
