//! The on-disk stack: file-import capture, filesystem store and SQLite.

use std::path::Path;
use std::sync::Arc;

use gallery::config::GalleryConfig;
use gallery::error::GalleryError;
use gallery::services::{ExecutionMode, FileImportCapture, UnavailableCapture};

use crate::common::fixtures::TestWorkspace;
use crate::common::init_test_logging;

fn file_count(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

fn config(ws: &TestWorkspace, mode: ExecutionMode) -> GalleryConfig {
    GalleryConfig {
        mode,
        data_dir: Some(ws.data_dir()),
        quality: 80,
        ..GalleryConfig::default()
    }
}

#[tokio::test]
async fn native_capture_writes_file_and_survives_reload() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let source = ws.source_image("red.png", [220, 20, 20]);
    let config = config(&ws, ExecutionMode::Native);

    let capture =
        FileImportCapture::new(&source, config.scratch_dir().unwrap(), config.mode).unwrap();
    let gallery = config.build_gallery(Arc::new(capture)).unwrap();
    gallery.initialize().await.unwrap();
    let record = gallery.capture().await.unwrap();

    let on_disk = config.files_dir().unwrap().join(record.file_name());
    assert!(on_disk.is_file());
    assert_eq!(record.filepath, format!("file://{}", on_disk.display()));
    assert_eq!(
        record.display_path,
        Some(format!("http://localhost/_app_file_{}", on_disk.display()))
    );
    let bytes = std::fs::read(&on_disk).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8], "stored as JPEG");

    let reopened = config.build_gallery(Arc::new(UnavailableCapture)).unwrap();
    let list = reopened.initialize().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].filepath, record.filepath);
    assert!(list[0].inline_content.is_none());
}

#[tokio::test]
async fn web_reload_rehydrates_from_data_directory() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let source = ws.source_image("green.png", [20, 200, 20]);
    let config = config(&ws, ExecutionMode::Web);

    let capture =
        FileImportCapture::new(&source, config.scratch_dir().unwrap(), config.mode).unwrap();
    let gallery = config.build_gallery(Arc::new(capture)).unwrap();
    gallery.initialize().await.unwrap();
    let record = gallery.capture().await.unwrap();
    assert!(!record.filepath.contains('/'));
    assert!(
        record
            .display_path
            .as_deref()
            .is_some_and(|p| p.starts_with("file://"))
    );

    let reopened = config.build_gallery(Arc::new(UnavailableCapture)).unwrap();
    let list = reopened.initialize().await.unwrap();
    assert_eq!(list.len(), 1);
    let inline = list[0].inline_content.as_deref().unwrap();
    assert!(inline.starts_with("data:image/jpeg;base64,/9j/"));
}

#[tokio::test]
async fn delete_removes_file_and_record() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let source = ws.source_image("blue.png", [20, 20, 220]);
    let config = config(&ws, ExecutionMode::Native);

    let capture =
        FileImportCapture::new(&source, config.scratch_dir().unwrap(), config.mode).unwrap();
    let gallery = config.build_gallery(Arc::new(capture)).unwrap();
    gallery.initialize().await.unwrap();
    let first = gallery.capture().await.unwrap();
    let second = gallery.capture().await.unwrap();
    assert_ne!(first.filepath, second.filepath);

    assert!(gallery.delete(&first).await.unwrap());
    assert!(!config.files_dir().unwrap().join(first.file_name()).exists());
    assert!(config.files_dir().unwrap().join(second.file_name()).exists());

    let reopened = config.build_gallery(Arc::new(UnavailableCapture)).unwrap();
    let list = reopened.initialize().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].filepath, second.filepath);
}

#[tokio::test]
async fn reconcile_finds_externally_removed_file() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let source = ws.source_image("grey.png", [128, 128, 128]);
    let config = config(&ws, ExecutionMode::Native);

    let capture =
        FileImportCapture::new(&source, config.scratch_dir().unwrap(), config.mode).unwrap();
    let gallery = config.build_gallery(Arc::new(capture)).unwrap();
    gallery.initialize().await.unwrap();
    let kept = gallery.capture().await.unwrap();
    let lost = gallery.capture().await.unwrap();
    std::fs::remove_file(config.files_dir().unwrap().join(lost.file_name())).unwrap();

    std::fs::write(config.files_dir().unwrap().join("stray.jpeg"), b"x").unwrap();

    let report = gallery.reconcile().await.unwrap();
    assert_eq!(report.checked, 2);
    assert_eq!(report.missing, vec![lost.filepath.clone()]);
    assert_eq!(report.orphaned, vec!["stray.jpeg".to_string()]);
    assert!(gallery.find(&kept.filepath).is_some());
}

#[tokio::test]
async fn native_captures_leave_nothing_in_scratch() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let source = ws.source_image("many.png", [60, 120, 180]);
    let config = config(&ws, ExecutionMode::Native);
    let scratch = config.scratch_dir().unwrap();

    let capture = FileImportCapture::new(&source, &scratch, config.mode).unwrap();
    let gallery = config.build_gallery(Arc::new(capture)).unwrap();
    gallery.initialize().await.unwrap();

    let mut records = Vec::new();
    for _ in 0..3 {
        records.push(gallery.capture().await.unwrap());
        assert_eq!(file_count(&scratch), 0);
    }
    assert_eq!(file_count(&config.files_dir().unwrap()), 3);

    for record in &records {
        assert!(gallery.delete(record).await.unwrap());
    }
    assert_eq!(file_count(&config.files_dir().unwrap()), 0);
    assert_eq!(file_count(&scratch), 0);
    assert!(gallery.reconcile().await.unwrap().is_clean());
}

#[tokio::test]
async fn web_captures_are_kept_for_the_session_then_purged() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let source = ws.source_image("session.png", [5, 5, 5]);
    let config = config(&ws, ExecutionMode::Web);
    let scratch = config.scratch_dir().unwrap();

    let first = FileImportCapture::new(&source, &scratch, config.mode).unwrap();
    let gallery = config.build_gallery(Arc::new(first)).unwrap();
    gallery.initialize().await.unwrap();
    let record = gallery.capture().await.unwrap();
    let display = record.display_path.clone().unwrap();
    assert!(Path::new(display.trim_start_matches("file://")).exists());
    assert_eq!(file_count(&scratch), 1);

    let next = FileImportCapture::new(&source, &scratch, config.mode).unwrap();
    assert_eq!(next.purge_scratch().await.unwrap(), 1);
    assert_eq!(file_count(&scratch), 0);

    // The stored photo does not depend on the scratch copy.
    let reopened = config.build_gallery(Arc::new(next)).unwrap();
    let list = reopened.initialize().await.unwrap();
    assert_eq!(list[0].filepath, record.filepath);
    assert!(list[0].inline_content.is_some());
}

#[tokio::test]
async fn missing_source_fails_capture_cleanly() {
    init_test_logging();
    let ws = TestWorkspace::new();
    let config = config(&ws, ExecutionMode::Native);

    let capture = FileImportCapture::new(
        ws.path().join("nope.png"),
        config.scratch_dir().unwrap(),
        config.mode,
    )
    .unwrap();
    let gallery = config.build_gallery(Arc::new(capture)).unwrap();
    gallery.initialize().await.unwrap();

    let err = gallery.capture().await.unwrap_err();
    assert!(matches!(err, GalleryError::SourceNotFound { .. }));
    assert!(gallery.photos().is_empty());
}
