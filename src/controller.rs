//! Photo gallery controller.
//!
//! Owns the in-memory gallery list and keeps it in step with durable state.
//! The list is published through a [`watch`] channel: [`PhotoGallery::photos`]
//! returns the current snapshot and [`PhotoGallery::subscribe`] hands out a
//! receiver that observes every publish.
//!
//! # Ordering and completion
//!
//! - `initialize` awaits every rehydration read before publishing.
//! - `capture` writes the file, publishes the new list, then awaits the
//!   key-value write before returning. A failed key-value write leaves the
//!   published list updated and the store stale. Unless the backend retains
//!   captures, the transient capture is released once it has been copied.
//! - `delete` writes the reduced list, deletes the file, then publishes. A
//!   failed file delete leaves the store updated and the file orphaned.
//!
//! Operations are not serialized against each other; concurrent calls race
//! and the last publish wins.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::backend::MediaBackend;
use crate::error::{GalleryError, Result};
use crate::record::{FileNamer, PhotoRecord, decode_gallery, encode_gallery, inline_data_uri};
use crate::services::{
    CaptureRequest, CaptureService, CaptureSource, CapturedImage, Directory, ExecutionMode,
    FileStore, KeyValueStore, ResultFormat,
};

/// Default key-value key the gallery list is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "photos";

/// Default extension for captured files.
pub const DEFAULT_FILE_EXTENSION: &str = "jpeg";

/// Shared, immutable snapshot of the gallery list.
pub type PhotoList = Arc<Vec<PhotoRecord>>;

/// Collaborators the controller drives.
#[derive(Clone)]
pub struct GalleryServices {
    pub capture: Arc<dyn CaptureService>,
    pub files: Arc<dyn FileStore>,
    pub kv: Arc<dyn KeyValueStore>,
    pub backend: Arc<dyn MediaBackend>,
}

/// Tunables for a gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryOptions {
    pub storage_key: String,
    pub file_extension: String,
    pub quality: u8,
    pub source: CaptureSource,
    pub directory: Directory,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            quality: 100,
            source: CaptureSource::Camera,
            directory: Directory::Data,
        }
    }
}

/// Drift between the gallery list and the file store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Number of records checked.
    pub checked: usize,
    /// Filepaths of records with no backing file.
    pub missing: Vec<String>,
    /// Files in the gallery directory that no record refers to.
    pub orphaned: Vec<String>,
}

impl ReconcileReport {
    /// True when every record has its file and every file has its record.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.orphaned.is_empty()
    }
}

/// Controller for a single flat gallery of photo records.
pub struct PhotoGallery {
    services: GalleryServices,
    options: GalleryOptions,
    namer: FileNamer,
    state: watch::Sender<PhotoList>,
}

impl PhotoGallery {
    /// Create a controller with an empty list. Call [`initialize`](Self::initialize) to load.
    pub fn new(services: GalleryServices, options: GalleryOptions) -> Self {
        let (state, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            services,
            options,
            namer: FileNamer::new(),
            state,
        }
    }

    /// Execution mode of the selected backend.
    pub fn mode(&self) -> ExecutionMode {
        self.services.backend.mode()
    }

    /// Options this gallery was built with.
    pub const fn options(&self) -> &GalleryOptions {
        &self.options
    }

    /// Current published list.
    pub fn photos(&self) -> PhotoList {
        Arc::clone(&*self.state.borrow())
    }

    /// Receiver that observes every publish.
    pub fn subscribe(&self) -> watch::Receiver<PhotoList> {
        self.state.subscribe()
    }

    /// Look up a record by filepath.
    pub fn find(&self, filepath: &str) -> Option<PhotoRecord> {
        self.state
            .borrow()
            .iter()
            .find(|p| p.filepath == filepath)
            .cloned()
    }

    fn publish(&self, records: Vec<PhotoRecord>) -> PhotoList {
        let list = Arc::new(records);
        debug!(count = list.len(), "Publishing gallery");
        self.state.send_replace(Arc::clone(&list));
        list
    }

    /// Write the durable projection of `records` to the key-value store.
    async fn save(&self, records: &[PhotoRecord]) -> Result<()> {
        let raw = encode_gallery(records)?;
        self.services.kv.set(&self.options.storage_key, &raw).await?;
        debug!(count = records.len(), "Gallery saved");
        Ok(())
    }

    /// Load the stored list, rehydrate it if the backend requires, and publish it.
    #[instrument(skip(self), fields(key = %self.options.storage_key, mode = self.mode().as_str()))]
    pub async fn initialize(&self) -> Result<PhotoList> {
        let raw = self.services.kv.get(&self.options.storage_key).await?;
        let mut records = decode_gallery(raw.as_deref(), &self.options.storage_key)?;

        if self.services.backend.needs_rehydration() {
            records = self.rehydrate(records).await?;
        }

        info!(count = records.len(), "Gallery loaded");
        Ok(self.publish(records))
    }

    /// Read every record's file concurrently and attach it as inline content.
    async fn rehydrate(&self, records: Vec<PhotoRecord>) -> Result<Vec<PhotoRecord>> {
        let directory = self.options.directory;
        let reads = records.into_iter().map(|mut record| async move {
            let bytes = self
                .services
                .files
                .read(&record.filepath, Some(directory))
                .await?;
            let extension = record
                .file_name()
                .rsplit_once('.')
                .map_or(self.options.file_extension.as_str(), |(_, ext)| ext);
            let inline = inline_data_uri(&bytes, extension);
            record.inline_content = Some(inline);
            Ok::<_, GalleryError>(record)
        });
        try_join_all(reads).await
    }

    /// Capture a photo, store it, and prepend it to the gallery.
    ///
    /// Returns the new record. Cancellation or capture failure leaves the
    /// gallery untouched.
    #[instrument(skip(self), fields(mode = self.mode().as_str()))]
    pub async fn capture(&self) -> Result<PhotoRecord> {
        let request = CaptureRequest {
            quality: self.options.quality,
            source: self.options.source,
            result_format: ResultFormat::Uri,
        };
        let image = self.services.capture.capture(&request).await?;

        let file_name = self.namer.next_name(&self.options.file_extension);
        let persisted = self.persist(&image, &file_name).await;
        if !self.services.backend.retains_capture() {
            self.release_capture(&image).await;
        }
        let record = persisted?;

        let mut updated = Vec::with_capacity(self.state.borrow().len() + 1);
        updated.push(record.clone());
        updated.extend(self.state.borrow().iter().cloned());
        let published = self.publish(updated);

        self.save(&published).await?;
        info!(filepath = %record.filepath, total = published.len(), "Photo captured");
        Ok(record)
    }

    async fn release_capture(&self, image: &CapturedImage) {
        match self.services.capture.release(image).await {
            Ok(()) => debug!("Capture released"),
            // The photo is already stored; a stale capture is only clutter.
            Err(e) => warn!(error = %e, "Failed to release capture"),
        }
    }

    /// Write a captured image to the file store under `file_name` and build its record.
    #[instrument(skip(self, image))]
    pub async fn persist(&self, image: &CapturedImage, file_name: &str) -> Result<PhotoRecord> {
        let bytes = self.services.backend.read_captured(image).await?;
        let written = self
            .services
            .files
            .write(file_name, &bytes, self.options.directory)
            .await?;
        debug!(uri = %written.resolved_uri, bytes = bytes.len(), "Capture persisted");
        self.services
            .backend
            .build_record(image, file_name, &written)
    }

    /// Remove a record (matched by filepath) and delete its file.
    ///
    /// Returns `false` without touching any store when no record matches.
    #[instrument(skip(self, record), fields(filepath = %record.filepath))]
    pub async fn delete(&self, record: &PhotoRecord) -> Result<bool> {
        let current = self.photos();
        let remaining: Vec<PhotoRecord> = current
            .iter()
            .filter(|p| p.filepath != record.filepath)
            .cloned()
            .collect();

        if remaining.len() == current.len() {
            warn!("No matching record to delete");
            return Ok(false);
        }

        self.save(&remaining).await?;

        let file_name = record.file_name();
        self.services
            .files
            .delete(file_name, self.options.directory)
            .await?;

        self.publish(remaining);
        info!(file_name, "Photo deleted");
        Ok(true)
    }

    /// Compare the published list with the gallery directory. Never mutates state.
    ///
    /// Reports records whose file is gone and files no record refers to, such
    /// as the file left behind when `delete` fails after saving the list.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let current = self.photos();
        let directory = self.options.directory;
        let mut report = ReconcileReport {
            checked: current.len(),
            ..ReconcileReport::default()
        };

        for record in current.iter() {
            if !self
                .services
                .files
                .exists(&record.filepath, Some(directory))
                .await?
            {
                warn!(filepath = %record.filepath, "Record has no backing file");
                report.missing.push(record.filepath.clone());
            }
        }

        let referenced: HashSet<&str> = current.iter().map(PhotoRecord::file_name).collect();
        report.orphaned = self
            .services
            .files
            .list(directory)
            .await?
            .into_iter()
            .filter(|name| !referenced.contains(name.as_str()))
            .collect();
        for name in &report.orphaned {
            warn!(file_name = %name, "File has no record");
        }

        info!(
            checked = report.checked,
            missing = report.missing.len(),
            orphaned = report.orphaned.len(),
            "Reconcile complete"
        );
        Ok(report)
    }
}
