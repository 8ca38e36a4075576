//! Execution-mode media backends.
//!
//! Everything that differs between a native device runtime and a web runtime
//! sits behind [`MediaBackend`]: how captured bytes are obtained, how a
//! written file becomes a [`PhotoRecord`], and whether records need their
//! content rehydrated inline on load. A backend is chosen once at startup with
//! [`select_backend`].

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{GalleryError, Result};
use crate::record::PhotoRecord;
use crate::services::{
    CapturedImage, ExecutionMode, FileStore, ResourceFetcher, ServiceFuture, WriteResult,
};

/// Default origin that native display paths are served from.
pub const DEFAULT_SERVER_URL: &str = "http://localhost";

/// Path prefix for files served through the local origin.
pub const FILE_ROUTE: &str = "/_app_file_";

/// Mode-specific media handling.
pub trait MediaBackend: Send + Sync {
    /// Execution mode this backend implements.
    fn mode(&self) -> ExecutionMode;

    /// True when `filepath` is not directly displayable and records need
    /// inline content rebuilt on load.
    fn needs_rehydration(&self) -> bool;

    /// True when records keep referring to the captured resource, so it must
    /// outlive the capture call.
    fn retains_capture(&self) -> bool;

    /// Raw bytes of a freshly captured image.
    fn read_captured<'a>(&'a self, image: &'a CapturedImage) -> ServiceFuture<'a, Vec<u8>>;

    /// Build the record for a capture that was written to the file store.
    fn build_record(
        &self,
        image: &CapturedImage,
        file_name: &str,
        written: &WriteResult,
    ) -> Result<PhotoRecord>;
}

/// Convert a device file URI into a URI the display layer can load.
///
/// `file://` URIs and absolute paths map to `{server_url}/_app_file_{path}`.
/// Anything else is returned unchanged.
#[must_use]
pub fn convert_file_src(uri: &str, server_url: &str) -> String {
    let path = uri.strip_prefix("file://").unwrap_or(uri);
    if path.starts_with('/') {
        format!("{}{FILE_ROUTE}{path}", server_url.trim_end_matches('/'))
    } else {
        uri.to_string()
    }
}

/// Native device runtime: captures are read from their local path and records
/// point at the file store's resolved URI.
pub struct NativeMediaBackend {
    files: Arc<dyn FileStore>,
    server_url: String,
}

impl NativeMediaBackend {
    pub fn new(files: Arc<dyn FileStore>, server_url: impl Into<String>) -> Self {
        Self {
            files,
            server_url: server_url.into(),
        }
    }
}

impl MediaBackend for NativeMediaBackend {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Native
    }

    fn needs_rehydration(&self) -> bool {
        false
    }

    fn retains_capture(&self) -> bool {
        false
    }

    fn read_captured<'a>(&'a self, image: &'a CapturedImage) -> ServiceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let path = image
                .local_path
                .as_deref()
                .ok_or(GalleryError::MissingCapturePath { expected: "local" })?;
            debug!(path, "Reading native capture");
            self.files.read(path, None).await
        })
    }

    #[instrument(skip(self, _image))]
    fn build_record(
        &self,
        _image: &CapturedImage,
        file_name: &str,
        written: &WriteResult,
    ) -> Result<PhotoRecord> {
        Ok(PhotoRecord::new(written.resolved_uri.clone())
            .with_display_path(convert_file_src(&written.resolved_uri, &self.server_url)))
    }
}

/// Web runtime: captures are fetched from their web path and records are keyed
/// by bare file name, displayed through the session-scoped web path.
pub struct WebMediaBackend {
    fetcher: Arc<dyn ResourceFetcher>,
}

impl WebMediaBackend {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self { fetcher }
    }
}

impl MediaBackend for WebMediaBackend {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Web
    }

    fn needs_rehydration(&self) -> bool {
        true
    }

    // The display path is the capture's web path.
    fn retains_capture(&self) -> bool {
        true
    }

    fn read_captured<'a>(&'a self, image: &'a CapturedImage) -> ServiceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let web_path = image
                .web_path
                .as_deref()
                .ok_or(GalleryError::MissingCapturePath { expected: "web" })?;
            debug!(web_path, "Fetching web capture");
            self.fetcher.fetch(web_path).await
        })
    }

    #[instrument(skip(self, image, _written))]
    fn build_record(
        &self,
        image: &CapturedImage,
        file_name: &str,
        _written: &WriteResult,
    ) -> Result<PhotoRecord> {
        let mut record = PhotoRecord::new(file_name);
        record.display_path.clone_from(&image.web_path);
        Ok(record)
    }
}

/// Pick the backend for an execution mode.
pub fn select_backend(
    mode: ExecutionMode,
    files: Arc<dyn FileStore>,
    fetcher: Arc<dyn ResourceFetcher>,
    server_url: &str,
) -> Arc<dyn MediaBackend> {
    debug!(mode = mode.as_str(), "Selecting media backend");
    match mode {
        ExecutionMode::Native => Arc::new(NativeMediaBackend::new(files, server_url)),
        ExecutionMode::Web => Arc::new(WebMediaBackend::new(fetcher)),
    }
}
