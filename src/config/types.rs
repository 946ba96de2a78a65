//! Core configuration types for inlining runs.

use serde::{Deserialize, Serialize};

/// Configuration for a media inlining run.
///
/// All fields have sensible defaults; construct via [`InlinerConfig::builder`]
/// or [`InlinerConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlinerConfig {
    /// Timeout in seconds for a single media download.
    ///
    /// A hung remote host degrades that single reference, never the run.
    pub(crate) download_timeout_secs: u64,

    /// Maximum size in bytes for a single downloaded media file.
    /// Larger responses are treated as fetch failures.
    pub(crate) max_media_size: usize,

    /// Cap on concurrent outbound media downloads within one run.
    pub(crate) max_concurrent_downloads: usize,

    /// Entities fetched per page when iterating a content collection.
    pub(crate) page_size: usize,

    /// Portable placeholder prefix substituted for the deployment origin
    /// in rewritten references.
    pub(crate) site_url_placeholder: String,

    /// User agent sent with media downloads.
    pub(crate) user_agent: String,
}

impl Default for InlinerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
