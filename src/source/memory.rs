//! In-memory `ContentSource` used by the test suite.

use std::collections::HashSet;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ContentSource, EntityPage, EntityPatch, PageRequest, SourceEntity, WriteOptions};

/// A `ContentSource` backed by a plain vector.
///
/// Records every accepted edit and can be told to reject edits for
/// specific entity ids, which is how the tests exercise write-failure
/// isolation.
pub struct MemorySource {
    collection: String,
    entities: Mutex<Vec<SourceEntity>>,
    edits: Mutex<Vec<(EntityPatch, WriteOptions)>>,
    failing_edit_ids: Mutex<HashSet<String>>,
}

impl MemorySource {
    #[must_use]
    pub fn new(collection: impl Into<String>, entities: Vec<SourceEntity>) -> Self {
        Self {
            collection: collection.into(),
            entities: Mutex::new(entities),
            edits: Mutex::new(Vec::new()),
            failing_edit_ids: Mutex::new(HashSet::new()),
        }
    }

    /// Make `edit` fail for the given entity id.
    pub fn fail_edits_for(&self, entity_id: impl Into<String>) {
        self.failing_edit_ids.lock().insert(entity_id.into());
    }

    /// All edits accepted so far, in order.
    #[must_use]
    pub fn edits(&self) -> Vec<(EntityPatch, WriteOptions)> {
        self.edits.lock().clone()
    }

    /// Overlay accepted edits onto the stored entities, so a second run
    /// sees the rewritten content.
    pub fn apply_edits_to_entities(&self) {
        let edits = self.edits.lock();
        let mut entities = self.entities.lock();
        for (patch, _) in edits.iter() {
            if let Some(entity) = entities.iter_mut().find(|e| e.id == patch.entity_id) {
                entity.apply_patch(&patch.fields);
            }
        }
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn find_page(&self, request: PageRequest) -> Result<EntityPage> {
        let entities = self.entities.lock();
        let start = (request.page.saturating_sub(1) as usize) * request.limit;
        let page: Vec<SourceEntity> = entities.iter().skip(start).take(request.limit).cloned().collect();
        let next_page = if start + request.limit < entities.len() {
            Some(request.page + 1)
        } else {
            None
        };

        Ok(EntityPage {
            entities: page,
            next_page,
        })
    }

    async fn edit(&self, patch: EntityPatch, options: WriteOptions) -> Result<()> {
        if self.failing_edit_ids.lock().contains(&patch.entity_id) {
            return Err(anyhow!("error saving {}", patch.entity_id));
        }

        self.edits.lock().push((patch, options));
        Ok(())
    }
}
