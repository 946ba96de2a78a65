//! Batch pipeline that copies externally hosted media into local storage
//! and rewrites content references to the local copies.
//!
//! The pipeline scans heterogeneous content collections (rich-document
//! bodies and flat URL fields) for media hosted on allow-listed external
//! hosts, downloads it, persists it through an extension-dispatched
//! storage backend and writes rewritten references back through the
//! content source. Failures are isolated per reference and per entity;
//! a run only aborts when the content store itself is unreachable.

pub mod config;
pub mod downloader;
pub mod extractor;
pub mod inliner;
pub mod rewriter;
pub mod social_urls;
pub mod source;
pub mod storage;
pub mod utils;

pub use config::{InlinerConfig, InlinerConfigBuilder};
pub use downloader::{FetchFailure, MediaDownloader};
pub use extractor::{Extraction, HostFilter, MediaReference, RefLocation};
pub use inliner::{InlineError, InlineReport, MediaInliner};
pub use rewriter::StoredMedia;
pub use source::{
    CollectionSpec, ContentSource, EntityPage, EntityPatch, FieldTarget, MemorySource,
    PageRequest, SourceEntity, WriteOptions,
};
pub use storage::{LocalFileStorage, MediaStorage, StorageRegistry};
