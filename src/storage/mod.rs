//! Storage backends and extension-based dispatch.
//!
//! The registry is an explicitly constructed, injected lookup table from
//! file extension to backend. No ambient global state: tests substitute
//! fakes by building their own registry.

pub mod local;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

pub use local::LocalFileStorage;

/// A backend capable of persisting media of some type.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Directory (relative to the site root) this backend stores into.
    fn target_dir(&self) -> PathBuf;

    /// Produce a collision-free target path for a requested file name.
    ///
    /// Names are generated by the backend, not the caller, so uniqueness
    /// holds even when saves run concurrently.
    async fn unique_file_name(&self, requested: &str) -> Result<PathBuf>;

    /// Persist bytes at a target path previously obtained from
    /// [`unique_file_name`](MediaStorage::unique_file_name). Returns the
    /// stored path in URL form (forward slashes, leading `/`).
    async fn save_raw(&self, bytes: &[u8], target: &Path) -> Result<String>;
}

/// Extension-keyed lookup table of storage backends.
#[derive(Clone, Default)]
pub struct StorageRegistry {
    backends: HashMap<String, Arc<dyn MediaStorage>>,
}

impl StorageRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend for a file extension. Keys are normalized to
    /// lower case with a leading dot, so `.JPG`, `jpg` and `.jpg` all
    /// address the same backend.
    #[must_use]
    pub fn register(mut self, extension: &str, backend: Arc<dyn MediaStorage>) -> Self {
        self.backends.insert(normalize_extension(extension), backend);
        self
    }

    /// Look up the backend for an extension, or `None` when media of
    /// that type cannot be stored. `None` is an expected outcome the
    /// caller must treat as a per-reference skip.
    #[must_use]
    pub fn resolve(&self, extension: &str) -> Option<Arc<dyn MediaStorage>> {
        self.backends.get(&normalize_extension(extension)).cloned()
    }
}

fn normalize_extension(extension: &str) -> String {
    let lowered = extension.to_lowercase();
    if lowered.starts_with('.') {
        lowered
    } else {
        format!(".{lowered}")
    }
}
