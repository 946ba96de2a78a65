//! End-to-end tests for the inlining pipeline over rich-document content,
//! exercising failure isolation per reference and per entity.

mod common;

use std::sync::Arc;

use assert_fs::TempDir;
use external_media_inliner::{CollectionSpec, InlinerConfig, MediaInliner, MemorySource};
use serde_json::{Value, json};

use common::{GIF1X1, document_with_image, entity, jpg_registry};

#[tokio::test]
async fn inlines_image_in_document_body() {
    let mut server = mockito::Server::new_async().await;
    let image = server
        .mock("GET", "/files/f/image.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(GIF1X1)
        .create_async()
        .await;

    let image_url = format!("{}/files/f/image.jpg", server.url());
    let source = Arc::new(MemorySource::new(
        "posts",
        vec![entity(
            "inlined-post-id",
            json!({ "mobiledoc": document_with_image(&image_url) }),
        )],
    ));

    let storage_dir = TempDir::new().expect("tempdir");
    let inliner = MediaInliner::new(InlinerConfig::default(), jpg_registry(storage_dir.path()))
        .bind(source.clone(), CollectionSpec::posts());

    let report = inliner.inline(&[server.url()]).await.expect("run");

    image.assert_async().await;
    assert_eq!(report.references_found, 1);
    assert_eq!(report.references_inlined, 1);
    assert!(!report.has_failures());

    let edits = source.edits();
    assert_eq!(edits.len(), 1);
    let (patch, options) = &edits[0];
    assert_eq!(patch.entity_id, "inlined-post-id");
    assert!(options.internal);

    let rewritten: Value =
        serde_json::from_str(patch.fields["mobiledoc"].as_str().expect("document")).expect("json");
    assert_eq!(
        rewritten,
        json!({
            "version": "0.3.1",
            "atoms": [],
            "cards": [["image", { "src": "__SITE_URL__/content/images/image.jpg" }]],
        })
    );

    let saved = std::fs::read(storage_dir.path().join("content/images/image.jpg")).expect("saved");
    assert_eq!(saved, GIF1X1);
}

#[tokio::test]
async fn fetch_failure_leaves_entity_unmodified() {
    let mut server = mockito::Server::new_async().await;
    let image = server
        .mock("GET", "/files/f/image.jpg")
        .with_status(404)
        .create_async()
        .await;

    let image_url = format!("{}/files/f/image.jpg", server.url());
    let source = Arc::new(MemorySource::new(
        "posts",
        vec![entity(
            "inlined-post-id",
            json!({ "mobiledoc": document_with_image(&image_url) }),
        )],
    ));

    let storage_dir = TempDir::new().expect("tempdir");
    let inliner = MediaInliner::new(InlinerConfig::default(), jpg_registry(storage_dir.path()))
        .bind(source.clone(), CollectionSpec::posts());

    let report = inliner.inline(&[server.url()]).await.expect("run");

    image.assert_async().await;
    assert_eq!(report.references_found, 1);
    assert_eq!(report.failed_fetches, 1);
    assert_eq!(report.references_inlined, 0);
    assert!(source.edits().is_empty());
}

#[tokio::test]
async fn unregistered_extension_is_skipped_with_no_write() {
    let mut server = mockito::Server::new_async().await;
    let binary = server
        .mock("GET", "/files/f/inlined.exe")
        .with_status(200)
        .with_body(GIF1X1)
        .create_async()
        .await;

    let file_url = format!("{}/files/f/inlined.exe", server.url());
    let source = Arc::new(MemorySource::new(
        "posts",
        vec![entity(
            "inlined-post-id",
            json!({ "mobiledoc": document_with_image(&file_url) }),
        )],
    ));

    let storage_dir = TempDir::new().expect("tempdir");
    let inliner = MediaInliner::new(InlinerConfig::default(), jpg_registry(storage_dir.path()))
        .bind(source.clone(), CollectionSpec::posts());

    let report = inliner.inline(&[server.url()]).await.expect("run");

    binary.assert_async().await;
    assert_eq!(report.references_found, 1);
    assert_eq!(report.skipped_no_backend, 1);
    assert_eq!(report.references_inlined, 0);
    assert!(source.edits().is_empty());
}

#[tokio::test]
async fn failed_reference_does_not_block_others_in_same_entity() {
    let mut server = mockito::Server::new_async().await;
    let broken = server
        .mock("GET", "/files/f/a.jpg")
        .with_status(500)
        .create_async()
        .await;
    let working = server
        .mock("GET", "/files/f/b.jpg")
        .with_status(200)
        .with_body(GIF1X1)
        .create_async()
        .await;

    let document = json!({
        "version": "0.3.1",
        "atoms": [],
        "cards": [
            ["image", { "src": format!("{}/files/f/a.jpg", server.url()) }],
            ["image", { "src": format!("{}/files/f/b.jpg", server.url()) }],
        ],
    })
    .to_string();
    let source = Arc::new(MemorySource::new(
        "posts",
        vec![entity("post-1", json!({ "mobiledoc": document }))],
    ));

    let storage_dir = TempDir::new().expect("tempdir");
    let inliner = MediaInliner::new(InlinerConfig::default(), jpg_registry(storage_dir.path()))
        .bind(source.clone(), CollectionSpec::posts());

    let report = inliner.inline(&[server.url()]).await.expect("run");

    broken.assert_async().await;
    working.assert_async().await;
    assert_eq!(report.references_found, 2);
    assert_eq!(report.failed_fetches, 1);
    assert_eq!(report.references_inlined, 1);

    let edits = source.edits();
    assert_eq!(edits.len(), 1);
    let rewritten: Value =
        serde_json::from_str(edits[0].0.fields["mobiledoc"].as_str().expect("document"))
            .expect("json");
    // The failed reference keeps its external URL; the stored one is local.
    assert_eq!(
        rewritten["cards"][0][1]["src"],
        json!(format!("{}/files/f/a.jpg", server.url()))
    );
    assert_eq!(
        rewritten["cards"][1][1]["src"],
        json!("__SITE_URL__/content/images/b.jpg")
    );
}

#[tokio::test]
async fn write_failure_does_not_block_later_entities() {
    let mut server = mockito::Server::new_async().await;
    let _first = server
        .mock("GET", "/files/f/a.jpg")
        .with_status(200)
        .with_body(GIF1X1)
        .create_async()
        .await;
    let _second = server
        .mock("GET", "/files/f/b.jpg")
        .with_status(200)
        .with_body(GIF1X1)
        .create_async()
        .await;

    let source = Arc::new(MemorySource::new(
        "posts",
        vec![
            entity(
                "errored-post-id",
                json!({ "feature_image": format!("{}/files/f/a.jpg", server.url()) }),
            ),
            entity(
                "inlined-post-id",
                json!({ "feature_image": format!("{}/files/f/b.jpg", server.url()) }),
            ),
        ],
    ));
    source.fail_edits_for("errored-post-id");

    let storage_dir = TempDir::new().expect("tempdir");
    let inliner = MediaInliner::new(InlinerConfig::default(), jpg_registry(storage_dir.path()))
        .bind(source.clone(), CollectionSpec::posts());

    let report = inliner.inline(&[server.url()]).await.expect("run");

    assert_eq!(report.failed_writes, 1);
    assert_eq!(report.references_inlined, 1);

    let edits = source.edits();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].0.entity_id, "inlined-post-id");
}

#[tokio::test]
async fn malformed_document_is_counted_and_skipped() {
    let source = Arc::new(MemorySource::new(
        "posts",
        vec![entity("post-1", json!({ "mobiledoc": "{not json" }))],
    ));

    let storage_dir = TempDir::new().expect("tempdir");
    let inliner = MediaInliner::new(InlinerConfig::default(), jpg_registry(storage_dir.path()))
        .bind(source.clone(), CollectionSpec::posts());

    let report = inliner
        .inline(&["https://img.stockfresh.com".to_string()])
        .await
        .expect("run");

    assert_eq!(report.extraction_failures, 1);
    assert_eq!(report.references_found, 0);
    assert!(source.edits().is_empty());
}

#[tokio::test]
async fn second_run_is_a_noop() {
    let mut server = mockito::Server::new_async().await;
    let image = server
        .mock("GET", "/files/f/image.jpg")
        .with_status(200)
        .with_body(GIF1X1)
        .expect(1)
        .create_async()
        .await;

    let image_url = format!("{}/files/f/image.jpg", server.url());
    let source = Arc::new(MemorySource::new(
        "posts",
        vec![entity(
            "post-1",
            json!({ "mobiledoc": document_with_image(&image_url) }),
        )],
    ));

    let storage_dir = TempDir::new().expect("tempdir");
    let inliner = MediaInliner::new(InlinerConfig::default(), jpg_registry(storage_dir.path()))
        .bind(source.clone(), CollectionSpec::posts());

    let first = inliner.inline(&[server.url()]).await.expect("first run");
    assert_eq!(first.references_inlined, 1);

    // Persist the rewrite, then run again: the local placeholder no longer
    // qualifies under the allow list.
    source.apply_edits_to_entities();
    let second = inliner.inline(&[server.url()]).await.expect("second run");

    assert_eq!(second.references_found, 0);
    assert_eq!(second.references_inlined, 0);
    assert_eq!(source.edits().len(), 1);
    image.assert_async().await;
}

#[tokio::test]
async fn pagination_is_exhausted() {
    let mut server = mockito::Server::new_async().await;
    let mut mocks = Vec::new();
    for name in ["a", "b", "c"] {
        let mock = server
            .mock("GET", format!("/files/f/{name}.jpg").as_str())
            .with_status(200)
            .with_body(GIF1X1)
            .create_async()
            .await;
        mocks.push(mock);
    }

    let entities = ["a", "b", "c"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            entity(
                format!("post-{i}").as_str(),
                json!({ "feature_image": format!("{}/files/f/{name}.jpg", server.url()) }),
            )
        })
        .collect();
    let source = Arc::new(MemorySource::new("posts", entities));

    let storage_dir = TempDir::new().expect("tempdir");
    let config = InlinerConfig::builder().page_size(1).build();
    let inliner = MediaInliner::new(config, jpg_registry(storage_dir.path()))
        .bind(source.clone(), CollectionSpec::posts());

    let report = inliner.inline(&[server.url()]).await.expect("run");

    assert_eq!(report.references_found, 3);
    assert_eq!(report.references_inlined, 3);
    assert_eq!(source.edits().len(), 3);
}

#[tokio::test]
async fn cancelled_run_returns_partial_report_without_error() {
    let mut server = mockito::Server::new_async().await;
    let image = server
        .mock("GET", "/files/f/image.jpg")
        .with_status(200)
        .with_body(GIF1X1)
        .expect(0)
        .create_async()
        .await;

    let image_url = format!("{}/files/f/image.jpg", server.url());
    let source = Arc::new(MemorySource::new(
        "posts",
        vec![entity(
            "post-1",
            json!({ "feature_image": image_url }),
        )],
    ));

    let storage_dir = TempDir::new().expect("tempdir");
    let inliner = MediaInliner::new(InlinerConfig::default(), jpg_registry(storage_dir.path()))
        .bind(source.clone(), CollectionSpec::posts());

    inliner
        .cancel_flag()
        .store(true, std::sync::atomic::Ordering::Relaxed);
    let report = inliner.inline(&[server.url()]).await.expect("run");

    image.assert_async().await;
    assert_eq!(report, external_media_inliner::InlineReport::default());
    assert!(source.edits().is_empty());
}

#[tokio::test]
async fn entities_without_matching_references_get_zero_writes() {
    let source = Arc::new(MemorySource::new(
        "posts",
        vec![entity(
            "post-1",
            json!({ "feature_image": "https://elsewhere.example.com/files/f/image.jpg" }),
        )],
    ));

    let storage_dir = TempDir::new().expect("tempdir");
    let inliner = MediaInliner::new(InlinerConfig::default(), jpg_registry(storage_dir.path()))
        .bind(source.clone(), CollectionSpec::posts());

    let report = inliner
        .inline(&["https://img.stockfresh.com".to_string()])
        .await
        .expect("run");

    assert_eq!(report.references_found, 0);
    assert!(source.edits().is_empty());
}
