//! Shared helpers for URL handling and crate-wide defaults.

pub mod constants;
pub mod url_utils;

pub use url_utils::{file_extension, file_name, is_external_url};
