//! Canonicalization of stored social profile handles.
//!
//! Profiles are stored as bare handles and rendered as full profile URLs.
//! These are pure transforms, deliberately kept outside the inlining
//! pipeline.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static TWITTER_HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{1,15}$").expect("valid handle pattern"));

/// Canonical profile URL for a stored Twitter handle. A leading `@` is
/// accepted and stripped.
#[must_use]
pub fn twitter_profile_url(handle: &str) -> String {
    let handle = handle.trim().trim_start_matches('@');
    format!("https://twitter.com/{handle}")
}

/// Canonical profile URL for a stored Facebook page path. A leading `/`
/// is accepted and stripped.
#[must_use]
pub fn facebook_profile_url(page: &str) -> String {
    let page = page.trim().trim_start_matches('/');
    format!("https://www.facebook.com/{page}")
}

/// Extract and validate the handle from a pasted Twitter profile URL.
///
/// Accepts `twitter.com` and `x.com` profiles; anything else, including
/// URLs whose first path segment is not a valid handle, yields `None`.
#[must_use]
pub fn twitter_handle_from_url(value: &str) -> Option<String> {
    let parsed = Url::parse(value).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host != "twitter.com" && host != "x.com" {
        return None;
    }

    let handle = parsed.path_segments()?.find(|s| !s.is_empty())?;
    let handle = handle.strip_prefix('@').unwrap_or(handle);
    if !TWITTER_HANDLE_RE.is_match(handle) {
        return None;
    }

    Some(format!("@{handle}"))
}

/// Extract the page path from a pasted Facebook profile URL.
#[must_use]
pub fn facebook_page_from_url(value: &str) -> Option<String> {
    let parsed = Url::parse(value).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host != "facebook.com" {
        return None;
    }

    let page = parsed.path().trim_matches('/');
    if page.is_empty() {
        return None;
    }

    Some(page.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_canonicalize_to_profile_urls() {
        assert_eq!(twitter_profile_url("@acmeblog"), "https://twitter.com/acmeblog");
        assert_eq!(twitter_profile_url("acmeblog"), "https://twitter.com/acmeblog");
        assert_eq!(
            facebook_profile_url("/acme.page"),
            "https://www.facebook.com/acme.page"
        );
    }

    #[test]
    fn twitter_urls_round_trip_to_handles() {
        assert_eq!(
            twitter_handle_from_url("https://twitter.com/acmeblog"),
            Some("@acmeblog".to_string())
        );
        assert_eq!(
            twitter_handle_from_url("https://www.x.com/acmeblog"),
            Some("@acmeblog".to_string())
        );
        assert_eq!(twitter_handle_from_url("https://example.com/acmeblog"), None);
        assert_eq!(
            twitter_handle_from_url("https://twitter.com/this-handle-is-way-too-long-to-be-valid"),
            None
        );
        assert_eq!(twitter_handle_from_url("not a url"), None);
    }

    #[test]
    fn facebook_urls_keep_nested_page_paths() {
        assert_eq!(
            facebook_page_from_url("https://www.facebook.com/groups/acmeblog"),
            Some("groups/acmeblog".to_string())
        );
        assert_eq!(facebook_page_from_url("https://www.facebook.com/"), None);
    }
}
