//! Stored list format and reload behavior.

use std::sync::Arc;

use gallery::backend::select_backend;
use gallery::controller::{DEFAULT_STORAGE_KEY, GalleryOptions, GalleryServices, PhotoGallery};
use gallery::record::{PhotoRecord, decode_gallery, encode_gallery};
use gallery::services::mock::{MockCapture, MockFetcher, MockFileStore};
use gallery::services::{ExecutionMode, KeyValueStore, SqliteKvStore};

use crate::common::init_test_logging;

fn gallery_over(
    kv: Arc<SqliteKvStore>,
    capture: Arc<MockCapture>,
    fetcher: Arc<MockFetcher>,
) -> PhotoGallery {
    let files = Arc::new(MockFileStore::new());
    PhotoGallery::new(
        GalleryServices {
            capture,
            files: files.clone(),
            kv,
            backend: select_backend(ExecutionMode::Web, files, fetcher, "http://localhost"),
        },
        GalleryOptions::default(),
    )
}

#[test]
fn stored_format_matches_documented_shape() {
    let mut with_inline = PhotoRecord::new("2.jpeg").with_display_path("blob:2");
    with_inline.inline_content = Some("data:image/jpeg;base64,AA==".to_string());
    let records = vec![with_inline, PhotoRecord::new("1.jpeg")];

    let raw = encode_gallery(&records).unwrap();
    assert_eq!(
        raw,
        r#"[{"filepath":"2.jpeg","displayPath":"blob:2"},{"filepath":"1.jpeg"}]"#
    );
}

#[test]
fn decode_ignores_unknown_fields_and_keeps_order() {
    let raw = r#"[
        {"filepath":"c.jpeg","displayPath":"x","webviewPath":"legacy"},
        {"filepath":"b.jpeg"},
        {"filepath":"a.jpeg","inlineContent":"data:image/jpeg;base64,AA=="}
    ]"#;
    let records = decode_gallery(Some(raw), DEFAULT_STORAGE_KEY).unwrap();
    let paths: Vec<&str> = records.iter().map(|r| r.filepath.as_str()).collect();
    assert_eq!(paths, vec!["c.jpeg", "b.jpeg", "a.jpeg"]);
    assert!(records.iter().all(|r| r.inline_content.is_none()));
}

#[test]
fn decode_requires_filepath() {
    let err = decode_gallery(Some(r#"[{"displayPath":"x"}]"#), "photos").unwrap_err();
    assert!(matches!(
        err,
        gallery::error::GalleryError::MalformedGallery { ref key, .. } if key == "photos"
    ));
}

#[tokio::test]
async fn list_round_trips_through_sqlite() {
    init_test_logging();
    let kv = Arc::new(SqliteKvStore::in_memory().unwrap());
    let capture = Arc::new(MockCapture::new());
    let fetcher = Arc::new(MockFetcher::new());
    for i in 0..3 {
        let path = format!("blob:{i}");
        capture.queue_web(&path);
        fetcher.insert(&path, &[i]);
    }

    let first = gallery_over(kv.clone(), capture.clone(), fetcher.clone());
    first.initialize().await.unwrap();
    for _ in 0..3 {
        first.capture().await.unwrap();
    }
    let expected: Vec<String> = first.photos().iter().map(|r| r.filepath.clone()).collect();

    let raw = kv.get(DEFAULT_STORAGE_KEY).await.unwrap();
    let reloaded = decode_gallery(raw.as_deref(), DEFAULT_STORAGE_KEY).unwrap();
    let actual: Vec<String> = reloaded.into_iter().map(|r| r.filepath).collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn custom_storage_key_is_used() {
    init_test_logging();
    let kv = Arc::new(SqliteKvStore::in_memory().unwrap());
    kv.set("other", r#"[{"filepath":"x.jpeg"}]"#).await.unwrap();

    let files = Arc::new(MockFileStore::new());
    let gallery = PhotoGallery::new(
        GalleryServices {
            capture: Arc::new(MockCapture::new()),
            files: files.clone(),
            kv: kv.clone(),
            backend: select_backend(
                ExecutionMode::Native,
                files,
                Arc::new(MockFetcher::new()),
                "http://localhost",
            ),
        },
        GalleryOptions {
            storage_key: "other".to_string(),
            ..GalleryOptions::default()
        },
    );

    let list = gallery.initialize().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(kv.get(DEFAULT_STORAGE_KEY).await.unwrap(), None);
}
