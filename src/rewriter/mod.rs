//! Rewriting of entity payloads after media has been stored locally.
//!
//! Purely data-in/data-out: given an entity and the media stored for it,
//! produce the sparse patch to persist, or `None` when nothing was stored
//! (no spurious writes). Performs no I/O.

use std::collections::HashMap;

use serde_json::Value;

use crate::extractor::{MediaReference, RefLocation};
use crate::source::{EntityPatch, SourceEntity};

/// A successfully stored media file, paired with the reference it
/// replaces and its new portable local URL.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub reference: MediaReference,
    pub local_url: String,
}

/// Build the sparse update for one entity from its stored media.
///
/// Rich-document fields are re-serialized whole (sub-elements are not
/// independently addressable at write time); flat fields patch only the
/// touched names.
#[must_use]
pub fn apply(entity: &SourceEntity, collection: &str, stored: &[StoredMedia]) -> Option<EntityPatch> {
    let mut patch = serde_json::Map::new();
    // field -> [(card index, attr, local url)]
    let mut card_edits: HashMap<&str, Vec<(usize, &str, &str)>> = HashMap::new();

    for media in stored {
        if media.reference.entity_id != entity.id {
            continue;
        }

        match &media.reference.location {
            RefLocation::Field { name } => {
                patch.insert(name.clone(), Value::String(media.local_url.clone()));
            }
            RefLocation::Card { field, index, attr } => {
                card_edits
                    .entry(field.as_str())
                    .or_default()
                    .push((*index, attr, media.local_url.as_str()));
            }
        }
    }

    for (field, edits) in card_edits {
        if let Some(document) = rewrite_document(entity, collection, field, &edits) {
            patch.insert(field.to_string(), Value::String(document));
        }
    }

    if patch.is_empty() {
        return None;
    }

    Some(EntityPatch {
        entity_id: entity.id.clone(),
        fields: patch,
    })
}

/// Re-serialize one rich-document field with the given card attributes
/// replaced. Returns `None` when the document cannot be rewritten (the
/// field vanished or no longer parses), which drops the document part of
/// the patch rather than writing garbage.
fn rewrite_document(
    entity: &SourceEntity,
    collection: &str,
    field: &str,
    edits: &[(usize, &str, &str)],
) -> Option<String> {
    let raw = entity.get(field)?;
    let mut document: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::error!(
                "Error rewriting document content for {collection}: {id}: {e}",
                id = entity.id
            );
            return None;
        }
    };

    let cards = document.get_mut("cards").and_then(Value::as_array_mut)?;
    let mut applied = false;

    for (index, attr, local_url) in edits {
        let payload = cards
            .get_mut(*index)
            .and_then(Value::as_array_mut)
            .and_then(|parts| parts.get_mut(1))
            .and_then(Value::as_object_mut);

        match payload {
            Some(payload) => {
                payload.insert((*attr).to_string(), Value::String((*local_url).to_string()));
                applied = true;
            }
            None => {
                log::debug!(
                    "Card {index} vanished from {collection}: {id} before rewrite",
                    id = entity.id
                );
            }
        }
    }

    applied.then(|| document.to_string())
}
