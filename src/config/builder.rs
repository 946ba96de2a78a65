//! Fluent builder for `InlinerConfig`.

use crate::utils::constants::{
    DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_DOWNLOADS, DEFAULT_MAX_MEDIA_SIZE,
    DEFAULT_PAGE_SIZE, DEFAULT_SITE_URL_PLACEHOLDER, DEFAULT_USER_AGENT,
};

use super::types::InlinerConfig;

/// Builder for [`InlinerConfig`] with documented defaults.
#[derive(Debug, Clone)]
pub struct InlinerConfigBuilder {
    download_timeout_secs: u64,
    max_media_size: usize,
    max_concurrent_downloads: usize,
    page_size: usize,
    site_url_placeholder: String,
    user_agent: String,
}

impl Default for InlinerConfigBuilder {
    fn default() -> Self {
        Self {
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            max_media_size: DEFAULT_MAX_MEDIA_SIZE,
            max_concurrent_downloads: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            page_size: DEFAULT_PAGE_SIZE,
            site_url_placeholder: DEFAULT_SITE_URL_PLACEHOLDER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl InlinerConfig {
    /// Create a builder with default values.
    #[must_use]
    pub fn builder() -> InlinerConfigBuilder {
        InlinerConfigBuilder::default()
    }
}

impl InlinerConfigBuilder {
    /// Timeout in seconds for a single media download.
    #[must_use]
    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.download_timeout_secs = secs;
        self
    }

    /// Maximum size in bytes for a single downloaded media file.
    #[must_use]
    pub fn max_media_size(mut self, bytes: usize) -> Self {
        self.max_media_size = bytes;
        self
    }

    /// Cap on concurrent outbound media downloads within one run.
    /// Values below 1 are clamped to 1.
    #[must_use]
    pub fn max_concurrent_downloads(mut self, cap: usize) -> Self {
        self.max_concurrent_downloads = cap.max(1);
        self
    }

    /// Entities fetched per page when iterating a content collection.
    /// Values below 1 are clamped to 1.
    #[must_use]
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Portable placeholder prefix substituted for the deployment origin
    /// in rewritten references. Any trailing slash is trimmed so that
    /// joining with backend paths never doubles the separator.
    #[must_use]
    pub fn site_url_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        let placeholder: String = placeholder.into();
        self.site_url_placeholder = placeholder.trim_end_matches('/').to_string();
        self
    }

    /// User agent sent with media downloads.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the final configuration.
    #[must_use]
    pub fn build(self) -> InlinerConfig {
        InlinerConfig {
            download_timeout_secs: self.download_timeout_secs,
            max_media_size: self.max_media_size,
            max_concurrent_downloads: self.max_concurrent_downloads,
            page_size: self.page_size,
            site_url_placeholder: self.site_url_placeholder,
            user_agent: self.user_agent,
        }
    }
}
