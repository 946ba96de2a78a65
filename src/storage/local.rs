//! Local filesystem storage backend.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use parking_lot::Mutex;

use super::MediaStorage;

/// How many numeric de-collision suffixes to try before falling back to
/// a random one.
const MAX_SUFFIX_ATTEMPTS: u32 = 50;

/// Stores media under a base directory on the local filesystem.
///
/// Target paths are expressed relative to the site root (for example
/// `content/images/photo.jpg`) and resolved against `base_dir` on disk.
/// A reservation set backs `unique_file_name`, so two concurrent saves
/// can never pick the same name even before either file exists.
pub struct LocalFileStorage {
    base_dir: PathBuf,
    target_dir: PathBuf,
    reserved: Mutex<HashSet<PathBuf>>,
}

impl LocalFileStorage {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            target_dir: target_dir.into(),
            reserved: Mutex::new(HashSet::new()),
        }
    }

    /// Backend for image media under `content/images`.
    #[must_use]
    pub fn images(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(base_dir, "content/images")
    }

    /// Backend for other file media under `content/files`.
    #[must_use]
    pub fn files(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(base_dir, "content/files")
    }

    fn absolute(&self, target: &Path) -> PathBuf {
        self.base_dir.join(target)
    }

    /// Reserve a target path if it is neither reserved nor on disk.
    fn try_reserve(&self, target: &Path, exists: bool) -> bool {
        if exists {
            return false;
        }
        self.reserved.lock().insert(target.to_path_buf())
    }
}

#[async_trait]
impl MediaStorage for LocalFileStorage {
    fn target_dir(&self) -> PathBuf {
        self.target_dir.clone()
    }

    async fn unique_file_name(&self, requested: &str) -> Result<PathBuf> {
        let sanitized = sanitize_filename::sanitize(requested);
        let (stem, extension) = match sanitized.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
                (stem.to_string(), Some(ext.to_string()))
            }
            _ => (sanitized.clone(), None),
        };
        let stem = if stem.is_empty() {
            "media".to_string()
        } else {
            stem
        };

        for attempt in 0..MAX_SUFFIX_ATTEMPTS {
            let name = candidate_name(&stem, extension.as_deref(), attempt);
            let target = self.target_dir.join(&name);
            let exists = tokio::fs::try_exists(self.absolute(&target))
                .await
                .with_context(|| format!("failed to probe target name {name}"))?;

            if self.try_reserve(&target, exists) {
                return Ok(target);
            }
        }

        // Sequential suffixes exhausted; a random one cannot collide with
        // meaningful probability.
        let suffix: u32 = rand::random();
        let name = match extension.as_deref() {
            Some(ext) => format!("{stem}-{suffix:08x}.{ext}"),
            None => format!("{stem}-{suffix:08x}"),
        };
        let target = self.target_dir.join(&name);
        if self.try_reserve(&target, false) {
            Ok(target)
        } else {
            Err(anyhow!("could not reserve a unique name for {requested}"))
        }
    }

    async fn save_raw(&self, bytes: &[u8], target: &Path) -> Result<String> {
        let absolute = self.absolute(target);
        let parent = absolute
            .parent()
            .ok_or_else(|| anyhow!("target path has no parent directory"))?;

        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
        tokio::fs::write(&absolute, bytes)
            .await
            .with_context(|| format!("failed to write {}", absolute.display()))?;

        self.reserved.lock().remove(target);

        let url_path = target.to_string_lossy().replace('\\', "/");
        Ok(format!("/{}", url_path.trim_start_matches('/')))
    }
}

fn candidate_name(stem: &str, extension: Option<&str>, attempt: u32) -> String {
    match (extension, attempt) {
        (Some(ext), 0) => format!("{stem}.{ext}"),
        (Some(ext), n) => format!("{stem}-{n}.{ext}"),
        (None, 0) => stem.to_string(),
        (None, n) => format!("{stem}-{n}"),
    }
}
