//! Collaborator contracts consumed by the gallery controller.
//!
//! Capture, file storage, key-value persistence and web resource fetching are
//! platform services. This module defines the shape the controller consumes;
//! concrete adapters live in the submodules, with recording mocks in [`mock`].

pub mod capture;
pub mod fs_store;
pub mod kv_sqlite;
pub mod mock;

pub use capture::{FileImportCapture, LocalResourceFetcher, UnavailableCapture};
pub use fs_store::FsFileStore;
pub use kv_sqlite::SqliteKvStore;

use std::future::Future;
use std::pin::Pin;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Object-safe boxed future returned by every collaborator method.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Whether the host runtime is a native device shell or a web runtime.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Device runtime: captures land on a local path, files resolve to servable URIs.
    #[default]
    Native,
    /// Web runtime: captures are session-scoped web paths, display needs inline content.
    Web,
}

impl ExecutionMode {
    /// Lowercase name used in config and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Web => "web",
        }
    }
}

/// Where the capture service should take the picture from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    /// Device camera.
    #[default]
    Camera,
    /// Existing photo library.
    Photos,
    /// Let the user choose.
    Prompt,
}

/// Shape of the capture result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    /// A path or URI to the captured file.
    #[default]
    Uri,
    /// Raw base64 content.
    Base64,
    /// A `data:` URI.
    DataUrl,
}

/// Parameters for a single capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    /// Encoding quality, 0-100.
    pub quality: u8,
    pub source: CaptureSource,
    pub result_format: ResultFormat,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            quality: 100,
            source: CaptureSource::Camera,
            result_format: ResultFormat::Uri,
        }
    }
}

/// A transient image resource produced by a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    /// Device-local path (native runtimes).
    pub local_path: Option<String>,
    /// Session-scoped web path.
    pub web_path: Option<String>,
    /// Image format, e.g. `jpeg`.
    pub format: String,
}

/// Storage area of the file store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directory {
    /// Private application data.
    #[default]
    Data,
    /// Disposable cache.
    Cache,
}

/// Result of a file store write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResult {
    /// Location the store resolved the write to.
    pub resolved_uri: String,
}

/// Camera access.
pub trait CaptureService: Send + Sync {
    /// Capture an image. Rejects with `CaptureCancelled` when the user backs out.
    fn capture<'a>(&'a self, request: &'a CaptureRequest) -> ServiceFuture<'a, CapturedImage>;

    /// Drop any transient resource backing `image` once the gallery no longer needs it.
    fn release<'a>(&'a self, _image: &'a CapturedImage) -> ServiceFuture<'a, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// Durable binary storage addressed by path.
pub trait FileStore: Send + Sync {
    /// Write `data` at `path` inside `directory`.
    fn write<'a>(
        &'a self,
        path: &'a str,
        data: &'a [u8],
        directory: Directory,
    ) -> ServiceFuture<'a, WriteResult>;

    /// Read the file at `path`. With no directory, `path` is a device path or `file://` URI.
    fn read<'a>(&'a self, path: &'a str, directory: Option<Directory>)
    -> ServiceFuture<'a, Vec<u8>>;

    /// Delete the file at `path` inside `directory`.
    fn delete<'a>(&'a self, path: &'a str, directory: Directory) -> ServiceFuture<'a, ()>;

    /// Whether a file exists at `path`, without reading it.
    fn exists<'a>(&'a self, path: &'a str, directory: Option<Directory>)
    -> ServiceFuture<'a, bool>;

    /// Names of the files directly inside `directory`, sorted.
    fn list(&self, directory: Directory) -> ServiceFuture<'_, Vec<String>>;
}

/// Durable string-keyed storage for small values.
pub trait KeyValueStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> ServiceFuture<'a, Option<String>>;

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> ServiceFuture<'a, ()>;

    fn remove<'a>(&'a self, key: &'a str) -> ServiceFuture<'a, ()>;
}

/// Fetches web-local resources (blob, data or file URLs) as raw bytes.
pub trait ResourceFetcher: Send + Sync {
    fn fetch<'a>(&'a self, web_path: &'a str) -> ServiceFuture<'a, Vec<u8>>;
}
