//! Mock collaborators for unit testing.
//!
//! Each mock keeps its state in memory, records every call for later
//! assertion, and supports one-shot error injection.
//!
//! # Example
//!
//! ```rust,ignore
//! use gallery::services::mock::{FileOperation, MockFileStore};
//! use gallery::services::{Directory, FileStore};
//!
//! let files = MockFileStore::new();
//! files.write("1.jpeg", b"img", Directory::Data).await?;
//!
//! files.assert_operations(&[FileOperation::Write {
//!     path: "1.jpeg".to_string(),
//!     directory: Directory::Data,
//!     bytes: 3,
//! }]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tracing::trace;

use super::{
    CaptureRequest, CaptureService, CapturedImage, Directory, FileStore, KeyValueStore,
    ResourceFetcher, ServiceFuture, WriteResult,
};
use crate::error::{GalleryError, Result};

/// Default URI prefix the mock file store resolves `Data` writes under.
pub const MOCK_DATA_URI: &str = "file:///data/";

// === Capture ===

/// Scripted capture service.
///
/// Each call pops the next queued outcome; an empty queue fails the capture.
#[derive(Debug, Default)]
pub struct MockCapture {
    queue: Mutex<VecDeque<Result<CapturedImage>>>,
    requests: Mutex<Vec<CaptureRequest>>,
    released: Mutex<Vec<CapturedImage>>,
}

impl MockCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful capture.
    pub fn queue(&self, image: CapturedImage) {
        self.queue.lock().unwrap().push_back(Ok(image));
    }

    /// Queue a capture with a device-local path.
    pub fn queue_local(&self, local_path: &str) {
        self.queue(CapturedImage {
            local_path: Some(local_path.to_string()),
            web_path: Some(format!("http://localhost/_app_file_{local_path}")),
            format: "jpeg".to_string(),
        });
    }

    /// Queue a capture with only a web path.
    pub fn queue_web(&self, web_path: &str) {
        self.queue(CapturedImage {
            local_path: None,
            web_path: Some(web_path.to_string()),
            format: "jpeg".to_string(),
        });
    }

    /// Queue a user cancellation.
    pub fn queue_cancel(&self) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Err(GalleryError::CaptureCancelled));
    }

    /// Queue an arbitrary failure.
    pub fn queue_error(&self, error: GalleryError) {
        self.queue.lock().unwrap().push_back(Err(error));
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CaptureRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Images handed back through `release`, in order.
    #[must_use]
    pub fn released(&self) -> Vec<CapturedImage> {
        self.released.lock().unwrap().clone()
    }
}

impl CaptureService for MockCapture {
    fn capture<'a>(&'a self, request: &'a CaptureRequest) -> ServiceFuture<'a, CapturedImage> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            let next = self.queue.lock().unwrap().pop_front();
            trace!(?next, "Mock capture");
            next.unwrap_or_else(|| {
                Err(GalleryError::CaptureFailed(
                    "mock capture queue is empty".to_string(),
                ))
            })
        })
    }

    fn release<'a>(&'a self, image: &'a CapturedImage) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            self.released.lock().unwrap().push(image.clone());
            Ok(())
        })
    }
}

// === File store ===

/// Recorded file store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    Write {
        path: String,
        directory: Directory,
        bytes: usize,
    },
    Read {
        path: String,
        directory: Option<Directory>,
    },
    Delete {
        path: String,
        directory: Directory,
    },
    Exists {
        path: String,
        directory: Option<Directory>,
    },
    List {
        directory: Directory,
    },
}

/// Kind of file store call, for targeted error injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOpKind {
    Write,
    Read,
    Delete,
    Exists,
    List,
}

impl FileOperation {
    #[must_use]
    pub const fn kind(&self) -> FileOpKind {
        match self {
            Self::Write { .. } => FileOpKind::Write,
            Self::Read { .. } => FileOpKind::Read,
            Self::Delete { .. } => FileOpKind::Delete,
            Self::Exists { .. } => FileOpKind::Exists,
            Self::List { .. } => FileOpKind::List,
        }
    }
}

type FileKey = (Option<Directory>, String);

/// In-memory file store.
///
/// `Data` writes resolve to `{data_uri}{path}`; reads of such URIs map back to
/// the `Data` directory. Files outside any directory (device paths) are added
/// with [`MockFileStore::add_device_file`].
#[derive(Debug)]
pub struct MockFileStore {
    files: Mutex<HashMap<FileKey, Vec<u8>>>,
    log: Mutex<Vec<FileOperation>>,
    error_injection: Mutex<Option<(Option<FileOpKind>, GalleryError)>>,
    data_uri: String,
}

impl Default for MockFileStore {
    fn default() -> Self {
        Self::with_data_uri(MOCK_DATA_URI)
    }
}

impl MockFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that resolves `Data` writes under `data_uri`.
    #[must_use]
    pub fn with_data_uri(data_uri: &str) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
            error_injection: Mutex::new(None),
            data_uri: data_uri.to_string(),
        }
    }

    /// Place a file at a device path (readable with no directory).
    pub fn add_device_file(&self, path: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert((None, path.to_string()), data.to_vec());
    }

    /// Place a file inside a directory without recording an operation.
    pub fn add_file(&self, path: &str, directory: Directory, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert((Some(directory), path.to_string()), data.to_vec());
    }

    /// Contents of a file inside a directory.
    #[must_use]
    pub fn file(&self, path: &str, directory: Directory) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(&(Some(directory), path.to_string()))
            .cloned()
    }

    /// Inject an error for the next call.
    pub fn inject_error(&self, error: GalleryError) {
        *self.error_injection.lock().unwrap() = Some((None, error));
    }

    /// Inject an error for the next call of one kind; other calls pass through.
    pub fn inject_error_on(&self, kind: FileOpKind, error: GalleryError) {
        *self.error_injection.lock().unwrap() = Some((Some(kind), error));
    }

    /// Paths of every file inside `directory`, sorted.
    #[must_use]
    pub fn files_in(&self, directory: Directory) -> Vec<String> {
        let mut names: Vec<String> = self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|(dir, _)| *dir == Some(directory))
            .map(|(_, path)| path.clone())
            .collect();
        names.sort();
        names
    }

    /// Get all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<FileOperation> {
        self.log.lock().unwrap().clone()
    }

    /// Number of reads performed.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, FileOperation::Read { .. }))
            .count()
    }

    /// Clear the operation log for fresh assertions.
    pub fn clear_operations(&self) {
        self.log.lock().unwrap().clear();
    }

    /// Assert specific operations were performed.
    ///
    /// # Panics
    ///
    /// Panics if the operations don't match.
    pub fn assert_operations(&self, expected: &[FileOperation]) {
        let actual = self.operations();
        assert_eq!(
            actual, expected,
            "Operation mismatch.\nExpected: {expected:#?}\nActual: {actual:#?}",
        );
    }

    /// Assert a specific operation was performed at least once.
    ///
    /// # Panics
    ///
    /// Panics if the operation was not found.
    pub fn assert_contains(&self, expected: &FileOperation) {
        let ops = self.operations();
        assert!(
            ops.contains(expected),
            "Expected operation {expected:?} not found in: {ops:#?}",
        );
    }

    fn record_op(&self, op: FileOperation) -> Result<()> {
        trace!(?op, "Recording file operation");
        let kind = op.kind();
        self.log.lock().unwrap().push(op);

        let mut injection = self.error_injection.lock().unwrap();
        let fires = injection
            .as_ref()
            .is_some_and(|(target, _)| target.is_none_or(|t| t == kind));
        match injection.take_if(|_| fires) {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }

    fn key(&self, path: &str, directory: Option<Directory>) -> FileKey {
        match path.strip_prefix(&self.data_uri) {
            Some(rest) => (Some(Directory::Data), rest.to_string()),
            None => (directory, path.to_string()),
        }
    }
}

impl FileStore for MockFileStore {
    fn write<'a>(
        &'a self,
        path: &'a str,
        data: &'a [u8],
        directory: Directory,
    ) -> ServiceFuture<'a, WriteResult> {
        Box::pin(async move {
            self.record_op(FileOperation::Write {
                path: path.to_string(),
                directory,
                bytes: data.len(),
            })?;
            self.files
                .lock()
                .unwrap()
                .insert((Some(directory), path.to_string()), data.to_vec());
            let resolved_uri = match directory {
                Directory::Data => format!("{}{path}", self.data_uri),
                Directory::Cache => format!("file:///cache/{path}"),
            };
            Ok(WriteResult { resolved_uri })
        })
    }

    fn read<'a>(
        &'a self,
        path: &'a str,
        directory: Option<Directory>,
    ) -> ServiceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            self.record_op(FileOperation::Read {
                path: path.to_string(),
                directory,
            })?;
            let key = self.key(path, directory);
            self.files
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .ok_or_else(|| GalleryError::FileNotFound {
                    path: path.to_string(),
                })
        })
    }

    fn delete<'a>(&'a self, path: &'a str, directory: Directory) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            self.record_op(FileOperation::Delete {
                path: path.to_string(),
                directory,
            })?;
            let key = self.key(path, Some(directory));
            self.files
                .lock()
                .unwrap()
                .remove(&key)
                .map(|_| ())
                .ok_or_else(|| GalleryError::FileNotFound {
                    path: path.to_string(),
                })
        })
    }

    fn exists<'a>(
        &'a self,
        path: &'a str,
        directory: Option<Directory>,
    ) -> ServiceFuture<'a, bool> {
        Box::pin(async move {
            self.record_op(FileOperation::Exists {
                path: path.to_string(),
                directory,
            })?;
            let key = self.key(path, directory);
            Ok(self.files.lock().unwrap().contains_key(&key))
        })
    }

    fn list(&self, directory: Directory) -> ServiceFuture<'_, Vec<String>> {
        Box::pin(async move {
            self.record_op(FileOperation::List { directory })?;
            Ok(self.files_in(directory))
        })
    }
}

// === Key-value store ===

/// Recorded key-value store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvOperation {
    Get { key: String },
    Set { key: String, value: String },
    Remove { key: String },
}

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MockKvStore {
    values: Mutex<HashMap<String, String>>,
    log: Mutex<Vec<KvOperation>>,
    error_injection: Mutex<Option<GalleryError>>,
}

impl MockKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one value.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Current value for a key.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Inject an error for the next call.
    pub fn inject_error(&self, error: GalleryError) {
        *self.error_injection.lock().unwrap() = Some(error);
    }

    /// Get all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<KvOperation> {
        self.log.lock().unwrap().clone()
    }

    /// All values written with `set`, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                KvOperation::Set { value, .. } => Some(value),
                _ => None,
            })
            .collect()
    }

    fn record_op(&self, op: KvOperation) -> Result<()> {
        trace!(?op, "Recording kv operation");
        self.log.lock().unwrap().push(op);
        match self.error_injection.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl KeyValueStore for MockKvStore {
    fn get<'a>(&'a self, key: &'a str) -> ServiceFuture<'a, Option<String>> {
        Box::pin(async move {
            self.record_op(KvOperation::Get {
                key: key.to_string(),
            })?;
            Ok(self.value(key))
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            self.record_op(KvOperation::Set {
                key: key.to_string(),
                value: value.to_string(),
            })?;
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            self.record_op(KvOperation::Remove {
                key: key.to_string(),
            })?;
            self.values.lock().unwrap().remove(key);
            Ok(())
        })
    }
}

// === Resource fetcher ===

/// In-memory resource fetcher keyed by web path.
#[derive(Debug, Default)]
pub struct MockFetcher {
    resources: Mutex<HashMap<String, Vec<u8>>>,
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `data` available at `web_path`.
    pub fn insert(&self, web_path: &str, data: &[u8]) {
        self.resources
            .lock()
            .unwrap()
            .insert(web_path.to_string(), data.to_vec());
    }

    /// Paths fetched so far.
    #[must_use]
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl ResourceFetcher for MockFetcher {
    fn fetch<'a>(&'a self, web_path: &'a str) -> ServiceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            self.fetched.lock().unwrap().push(web_path.to_string());
            self.resources
                .lock()
                .unwrap()
                .get(web_path)
                .cloned()
                .ok_or_else(|| GalleryError::Fetch {
                    path: web_path.to_string(),
                    reason: "not found".to_string(),
                })
        })
    }
}
