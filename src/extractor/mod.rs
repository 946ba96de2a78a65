//! Extraction of external media references from content entities.
//!
//! Given one entity and the fields a [`CollectionSpec`] marks as
//! interesting, produces the set of external media references found, each
//! tagged with enough context to be rewritten back into place. Parsing
//! failures are counted and logged, never raised: a malformed document
//! yields zero document references for that entity and the batch moves on.

use std::collections::HashSet;

use serde_json::Value;
use url::Url;

use crate::source::{CollectionSpec, FieldTarget, SourceEntity};
use crate::utils::is_external_url;

/// Embedded element types that carry a media URL attribute.
const CARD_URL_ATTRS: &[(&str, &str)] = &[
    ("image", "src"),
    ("audio", "src"),
    ("video", "src"),
    ("file", "src"),
];

/// One external media reference, tagged with its rewrite location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    /// Absolute external URL at extraction time.
    pub source_url: String,
    /// Id of the entity the reference was found in.
    pub entity_id: String,
    pub location: RefLocation,
}

/// Where a reference lives within its entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefLocation {
    /// An embedded element inside a rich-document body: the document
    /// field, the element index, and the attribute key holding the URL.
    Card {
        field: String,
        index: usize,
        attr: &'static str,
    },
    /// A flat scalar field holding the URL directly.
    Field { name: String },
}

/// References found in one entity plus the count of parse failures hit
/// along the way.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub references: Vec<MediaReference>,
    pub parse_failures: usize,
}

/// Allow-list of external hosts eligible for inlining in this run.
///
/// Entries may be bare hosts (`cdn.example.com`) or origins with scheme
/// (`https://cdn.example.com`). Comparison is by host, case-insensitive;
/// an entry carrying an explicit port only matches that port.
#[derive(Debug, Clone, Default)]
pub struct HostFilter {
    hosts: HashSet<String>,
}

impl HostFilter {
    #[must_use]
    pub fn new(entries: &[String]) -> Self {
        let mut hosts = HashSet::new();
        for entry in entries {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            // Bare hosts (and host:port pairs) only parse once given a scheme.
            let parsed = Url::parse(entry)
                .ok()
                .filter(|url| url.host_str().is_some())
                .or_else(|| {
                    Url::parse(&format!("https://{entry}"))
                        .ok()
                        .filter(|url| url.host_str().is_some())
                });
            match parsed {
                Some(url) => {
                    if let Some(host) = url.host_str() {
                        let host = host.to_lowercase();
                        match url.port() {
                            Some(port) => hosts.insert(format!("{host}:{port}")),
                            None => hosts.insert(host),
                        };
                    }
                }
                None => {
                    log::warn!("Ignoring unparseable external host entry: {entry}");
                }
            }
        }

        Self { hosts }
    }

    /// Whether a reference URL's host is allow-listed.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_lowercase();

        if self.hosts.contains(&host) {
            return true;
        }
        if let Some(port) = parsed.port() {
            return self.hosts.contains(&format!("{host}:{port}"));
        }

        false
    }
}

/// Extract all allow-listed external media references from one entity.
#[must_use]
pub fn extract(
    entity: &SourceEntity,
    collection: &str,
    spec: &CollectionSpec,
    filter: &HostFilter,
) -> Extraction {
    let mut extraction = Extraction::default();

    for target in spec.fields() {
        match target {
            FieldTarget::Document(field) => {
                extract_document(entity, collection, field, filter, &mut extraction);
            }
            FieldTarget::Url(field) => {
                extract_flat_field(entity, field, filter, &mut extraction);
            }
        }
    }

    extraction
}

/// Parse a rich-document body and collect one reference per embedded
/// element whose type carries a media URL attribute.
fn extract_document(
    entity: &SourceEntity,
    collection: &str,
    field: &str,
    filter: &HostFilter,
    extraction: &mut Extraction,
) {
    let Some(raw) = entity.get(field) else {
        return;
    };

    let document: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::error!(
                "Error parsing document content for {collection}: {id}: {e}",
                id = entity.id
            );
            extraction.parse_failures += 1;
            return;
        }
    };

    let Some(cards) = document.get("cards").and_then(Value::as_array) else {
        log::error!(
            "Error parsing document content for {collection}: {id}: no card list",
            id = entity.id
        );
        extraction.parse_failures += 1;
        return;
    };

    for (index, card) in cards.iter().enumerate() {
        let Some((card_type, payload)) = card_parts(card) else {
            log::debug!(
                "Skipping malformed card {index} in {collection}: {id}",
                id = entity.id
            );
            continue;
        };

        let Some(attr) = url_attr_for(card_type) else {
            continue;
        };
        let Some(src) = payload.get(attr).and_then(Value::as_str) else {
            continue;
        };

        if is_external_url(src) && filter.matches(src) {
            extraction.references.push(MediaReference {
                source_url: src.to_string(),
                entity_id: entity.id.clone(),
                location: RefLocation::Card {
                    field: field.to_string(),
                    index,
                    attr,
                },
            });
        }
    }
}

/// Collect a reference from a flat URL field, if it qualifies.
fn extract_flat_field(
    entity: &SourceEntity,
    field: &str,
    filter: &HostFilter,
    extraction: &mut Extraction,
) {
    let Some(value) = entity.get(field) else {
        return;
    };

    if is_external_url(value) && filter.matches(value) {
        extraction.references.push(MediaReference {
            source_url: value.to_string(),
            entity_id: entity.id.clone(),
            location: RefLocation::Field {
                name: field.to_string(),
            },
        });
    }
}

/// Split a card value into its type name and payload object.
fn card_parts(card: &Value) -> Option<(&str, &serde_json::Map<String, Value>)> {
    let parts = card.as_array()?;
    let card_type = parts.first()?.as_str()?;
    let payload = parts.get(1)?.as_object()?;

    Some((card_type, payload))
}

fn url_attr_for(card_type: &str) -> Option<&'static str> {
    CARD_URL_ATTRS
        .iter()
        .find(|(name, _)| *name == card_type)
        .map(|(_, attr)| *attr)
}
