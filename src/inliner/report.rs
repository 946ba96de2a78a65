//! Aggregate outcome of an inlining run.

/// Counts surfaced to the operator after a run.
///
/// Failures never abort the run, so this report plus one log line per
/// failure instance is the whole failure surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineReport {
    /// References discovered in allow-listed hosts across all collections.
    pub references_found: usize,
    /// References fully inlined: fetched, stored and written back.
    pub references_inlined: usize,
    /// References whose download failed (non-2xx, transport error, timeout
    /// or size overflow).
    pub failed_fetches: usize,
    /// References skipped because no storage backend handles their
    /// extension.
    pub skipped_no_backend: usize,
    /// References fetched but not persisted because the backend save
    /// failed.
    pub failed_saves: usize,
    /// Entities whose rich-document body could not be parsed.
    pub extraction_failures: usize,
    /// Entities whose write-back to the content store failed.
    pub failed_writes: usize,
}

impl InlineReport {
    /// References that reached a terminal state, successful or not.
    #[must_use]
    pub fn total(&self) -> usize {
        self.references_inlined + self.references_skipped()
    }

    /// Whether any failure of any kind occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed_fetches
            + self.skipped_no_backend
            + self.failed_saves
            + self.extraction_failures
            + self.failed_writes
            > 0
    }

    /// References that reached a terminal state other than inlined.
    #[must_use]
    pub fn references_skipped(&self) -> usize {
        self.failed_fetches + self.skipped_no_backend + self.failed_saves
    }
}
