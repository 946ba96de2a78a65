//! Crate-wide default values.

/// Timeout for a single media download.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Maximum size for a single downloaded media file (bytes).
///
/// Content bodies can embed video and audio, so this is deliberately
/// larger than a typical image cap. Anything above it degrades that
/// single reference, never the run.
pub const DEFAULT_MAX_MEDIA_SIZE: usize = 100 * 1024 * 1024;

/// Cap on concurrent outbound media downloads.
pub const DEFAULT_MAX_CONCURRENT_DOWNLOADS: usize = 8;

/// Entities fetched per page when iterating a content collection.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Portable placeholder substituted for the deployment origin in
/// rewritten references. Content stays valid when the deployment is
/// restored under a different host.
pub const DEFAULT_SITE_URL_PLACEHOLDER: &str = "__SITE_URL__";

/// User agent sent with media downloads.
pub const DEFAULT_USER_AGENT: &str = concat!("external-media-inliner/", env!("CARGO_PKG_VERSION"));
