//! Test helpers shared by the integration suite.

use std::path::Path;
use std::sync::Arc;

use external_media_inliner::{LocalFileStorage, SourceEntity, StorageRegistry};
use serde_json::{Value, json};

/// A 1x1 GIF: small, real bytes that are easy to assert on.
#[allow(dead_code)]
pub const GIF1X1: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x21, 0xf9,
    0x04, 0x01, 0x0a, 0x00, 0x01, 0x00, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
    0x00, 0x02, 0x02, 0x4c, 0x01, 0x00, 0x3b,
];

/// Build an entity from a JSON object literal.
#[allow(dead_code)]
pub fn entity(id: &str, fields: Value) -> SourceEntity {
    let Value::Object(map) = fields else {
        panic!("entity fields must be a JSON object");
    };
    SourceEntity::new(id, map)
}

/// A rich-document body embedding a single image card.
#[allow(dead_code)]
pub fn document_with_image(src: &str) -> String {
    json!({
        "version": "0.3.1",
        "atoms": [],
        "cards": [["image", { "src": src }]],
    })
    .to_string()
}

/// Registry with a local image backend for `.jpg` under `base_dir`.
#[allow(dead_code)]
pub fn jpg_registry(base_dir: &Path) -> StorageRegistry {
    StorageRegistry::new().register(".jpg", Arc::new(LocalFileStorage::images(base_dir)))
}
