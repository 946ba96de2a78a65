//! The inlining orchestrator.
//!
//! Drives the whole pipeline: pages through every bound collection,
//! extracts allow-listed references, downloads them with bounded
//! concurrency, dispatches storage by extension, rewrites the owning
//! entity and writes it back with the internal marker. Failures are
//! isolated to the single reference or entity in question; only a
//! content store that cannot be read at all aborts the run.

pub mod report;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::config::InlinerConfig;
use crate::downloader::MediaDownloader;
use crate::extractor::{self, HostFilter, MediaReference};
use crate::rewriter::{self, StoredMedia};
use crate::source::{CollectionSpec, ContentSource, PageRequest, SourceEntity, WriteOptions};
use crate::storage::StorageRegistry;
use crate::utils::{file_extension, file_name};

pub use report::InlineReport;

/// Errors that abort a whole run. Everything else is isolated and
/// surfaced through the [`InlineReport`].
#[derive(Debug, Error)]
pub enum InlineError {
    /// The content store could not be read; no progress is possible.
    #[error("content source error for {collection}: {source}")]
    Source {
        collection: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Terminal state of a single reference.
enum RefOutcome {
    Stored(StoredMedia),
    FetchFailed,
    NoBackend,
    SaveFailed,
}

struct SourceBinding {
    source: Arc<dyn ContentSource>,
    spec: CollectionSpec,
}

/// Batch pipeline that copies externally hosted media into local storage
/// and rewrites content references to the local copies.
pub struct MediaInliner {
    config: InlinerConfig,
    downloader: MediaDownloader,
    storage: StorageRegistry,
    bindings: Vec<SourceBinding>,
    cancelled: Arc<AtomicBool>,
}

impl MediaInliner {
    #[must_use]
    pub fn new(config: InlinerConfig, storage: StorageRegistry) -> Self {
        let downloader = MediaDownloader::new(config.clone());
        Self {
            config,
            downloader,
            storage,
            bindings: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bind a content collection to the fields the extractor should
    /// inspect. Collections are processed in binding order.
    #[must_use]
    pub fn bind(mut self, source: Arc<dyn ContentSource>, spec: CollectionSpec) -> Self {
        self.bindings.push(SourceBinding { source, spec });
        self
    }

    /// Flag for cooperative cancellation. Checked between entities, never
    /// between sub-steps of one entity, so partial entity updates stay
    /// atomic. A cancelled run returns the report accumulated so far.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Inline all media hosted on the given external hosts.
    ///
    /// This is the operator entry point, invoked out-of-band; it is not
    /// part of any live request path.
    pub async fn inline(&self, external_hosts: &[String]) -> Result<InlineReport, InlineError> {
        let filter = HostFilter::new(external_hosts);
        let download_slots = Arc::new(Semaphore::new(self.config.max_concurrent_downloads()));
        let mut inline_report = InlineReport::default();

        for binding in &self.bindings {
            if self.is_cancelled() {
                log::info!("Inlining cancelled, returning partial report");
                break;
            }
            self.inline_collection(binding, &filter, &download_slots, &mut inline_report)
                .await?;
        }

        log::info!(
            "Inlining done: {found} references found, {inlined} inlined, {fetch} failed downloads, {backend} without storage backend",
            found = inline_report.references_found,
            inlined = inline_report.references_inlined,
            fetch = inline_report.failed_fetches,
            backend = inline_report.skipped_no_backend,
        );

        Ok(inline_report)
    }

    /// Page through one collection, processing every entity. Exhausts all
    /// pages; only a failing page read propagates.
    async fn inline_collection(
        &self,
        binding: &SourceBinding,
        filter: &HostFilter,
        download_slots: &Arc<Semaphore>,
        inline_report: &mut InlineReport,
    ) -> Result<(), InlineError> {
        let collection = binding.source.collection();
        let mut page = 1u32;

        loop {
            let request = PageRequest {
                page,
                limit: self.config.page_size(),
            };
            let result =
                binding
                    .source
                    .find_page(request)
                    .await
                    .map_err(|source| InlineError::Source {
                        collection: collection.to_string(),
                        source,
                    })?;

            for entity in &result.entities {
                if self.is_cancelled() {
                    log::info!("Inlining cancelled while processing {collection}");
                    return Ok(());
                }
                self.process_entity(binding, entity, filter, download_slots, inline_report)
                    .await;
            }

            match result.next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(())
    }

    /// Run one entity through extract → download → store → rewrite →
    /// write-back. Never propagates: every failure is logged, counted and
    /// scoped to this entity or one of its references.
    async fn process_entity(
        &self,
        binding: &SourceBinding,
        entity: &SourceEntity,
        filter: &HostFilter,
        download_slots: &Arc<Semaphore>,
        inline_report: &mut InlineReport,
    ) {
        let collection = binding.source.collection();
        let extraction = extractor::extract(entity, collection, &binding.spec, filter);
        inline_report.extraction_failures += extraction.parse_failures;
        if extraction.references.is_empty() {
            return;
        }
        inline_report.references_found += extraction.references.len();

        let outcomes = join_all(extraction.references.into_iter().map(|reference| {
            let download_slots = Arc::clone(download_slots);
            async move {
                let Ok(_permit) = download_slots.acquire_owned().await else {
                    // Slots only close on shutdown.
                    log::debug!("Download slots closed, treating as fetch failure");
                    return RefOutcome::FetchFailed;
                };
                self.resolve_reference(reference).await
            }
        }))
        .await;

        let mut stored = Vec::new();
        for outcome in outcomes {
            match outcome {
                RefOutcome::Stored(media) => stored.push(media),
                RefOutcome::FetchFailed => inline_report.failed_fetches += 1,
                RefOutcome::NoBackend => inline_report.skipped_no_backend += 1,
                RefOutcome::SaveFailed => inline_report.failed_saves += 1,
            }
        }
        if stored.is_empty() {
            return;
        }

        let Some(patch) = rewriter::apply(entity, collection, &stored) else {
            return;
        };

        match binding.source.edit(patch, WriteOptions::internal()).await {
            Ok(()) => inline_report.references_inlined += stored.len(),
            Err(e) => {
                log::error!("Error inlining media for {collection}: {id}", id = entity.id);
                log::debug!("Write-back failure for {id}: {e:#}", id = entity.id);
                inline_report.failed_writes += 1;
            }
        }
    }

    /// Walk one reference through its state machine:
    /// fetched → storage resolved → saved. Each terminal failure is
    /// logged here, once.
    async fn resolve_reference(&self, reference: MediaReference) -> RefOutcome {
        let bytes = match self.downloader.download(&reference.source_url).await {
            Ok(bytes) => bytes,
            Err(failure) => {
                log::error!("Error downloading remote media: {url}", url = failure.url);
                log::debug!("Download failure: {reason}", reason = failure.reason);
                return RefOutcome::FetchFailed;
            }
        };

        let Some(extension) = file_extension(&reference.source_url) else {
            log::warn!(
                "No file extension in media URL: {url}",
                url = reference.source_url
            );
            return RefOutcome::NoBackend;
        };
        let Some(backend) = self.storage.resolve(&extension) else {
            log::warn!("No storage adapter found for file extension: {extension}");
            return RefOutcome::NoBackend;
        };

        let requested =
            file_name(&reference.source_url).unwrap_or_else(|| format!("media{extension}"));
        let saved = async {
            let target = backend.unique_file_name(&requested).await?;
            backend.save_raw(&bytes, &target).await
        }
        .await;

        match saved {
            Ok(stored_path) => {
                let local_url = format!("{}{stored_path}", self.config.site_url_placeholder());
                RefOutcome::Stored(StoredMedia {
                    reference,
                    local_url,
                })
            }
            Err(e) => {
                log::error!(
                    "Error storing remote media: {url}",
                    url = reference.source_url
                );
                log::debug!("Storage failure: {e:#}");
                RefOutcome::SaveFailed
            }
        }
    }
}
