//! URL inspection helpers for media references.

use url::Url;

/// Check whether a value is an absolute external URL.
///
/// Only `http` and `https` URLs qualify; relative paths, data URLs and
/// already-localized placeholder values do not.
#[must_use]
pub fn is_external_url(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }

    match Url::parse(value) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Extract the file extension from a URL path, lower-cased and including
/// the leading separator (e.g. `.jpg`).
///
/// Returns `None` when the path has no extension, since there is nothing
/// to dispatch a storage backend on.
#[must_use]
pub fn file_extension(value: &str) -> Option<String> {
    let parsed = Url::parse(value).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }

    Some(format!(".{}", ext.to_lowercase()))
}

/// Extract the file name from a URL path (the last non-empty segment).
#[must_use]
pub fn file_name(value: &str) -> Option<String> {
    let parsed = Url::parse(value).ok()?;
    let segment = parsed.path_segments()?.rev().find(|s| !s.is_empty())?;

    Some(segment.to_string())
}
