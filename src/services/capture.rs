//! Local capture and resource-fetch adapters.
//!
//! [`FileImportCapture`] stands in for a camera on hosts without one: it takes
//! an existing image, re-encodes it as JPEG at the requested quality into a
//! scratch directory, and reports the result the way the current execution
//! mode would. The configured file is the source whatever the request's
//! [`CaptureSource`](super::CaptureSource) says, and only URI results are
//! produced.
//!
//! Scratch files are released once the gallery has copied them. Those that
//! must outlive the capture (web display paths) are cleared by
//! [`FileImportCapture::purge_scratch`] at the start of the next session.

use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, info, trace};

use super::fs_store::file_uri;
use super::{
    CaptureRequest, CaptureService, CapturedImage, ExecutionMode, ResourceFetcher, ResultFormat,
    ServiceFuture,
};
use crate::error::{GalleryError, Result};
use crate::record::FileNamer;

const CAPTURE_FORMAT: &str = "jpeg";
const SCRATCH_PREFIX: &str = "capture-";

/// Capture service that imports an image file from disk.
#[derive(Debug)]
pub struct FileImportCapture {
    source: PathBuf,
    scratch_dir: PathBuf,
    mode: ExecutionMode,
    namer: FileNamer,
}

impl FileImportCapture {
    /// Create a capture service for `source`, writing transient captures to `scratch_dir`.
    pub fn new(
        source: impl Into<PathBuf>,
        scratch_dir: impl AsRef<Path>,
        mode: ExecutionMode,
    ) -> Result<Self> {
        Ok(Self {
            source: source.into(),
            scratch_dir: std::path::absolute(scratch_dir.as_ref())?,
            mode,
            namer: FileNamer::new(),
        })
    }

    /// Directory transient captures are written to.
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Remove captures left in the scratch directory by earlier sessions.
    ///
    /// Returns the number of files removed. Files this service did not name
    /// are left alone.
    pub async fn purge_scratch(&self) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.scratch_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let ours = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(SCRATCH_PREFIX));
            if ours && entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }
        debug!(dir = %self.scratch_dir.display(), removed, "Scratch purged");
        Ok(removed)
    }

    /// Scratch file behind a captured path or URI, if it is one of ours.
    fn scratch_file(&self, path: &str) -> Option<PathBuf> {
        let path = Path::new(path.strip_prefix("file://").unwrap_or(path));
        path.starts_with(&self.scratch_dir).then(|| path.to_path_buf())
    }
}

/// Decode `source` and re-encode it as JPEG.
pub fn encode_jpeg(source: &Path, quality: u8) -> Result<Vec<u8>> {
    if !source.is_file() {
        return Err(GalleryError::SourceNotFound {
            path: source.display().to_string(),
        });
    }
    if quality > 100 {
        return Err(GalleryError::InvalidQuality { value: quality });
    }

    let rgb = image::open(source)
        .map_err(|e| GalleryError::ImageProcessing(e.to_string()))?
        .to_rgb8();

    let mut buf = Cursor::new(Vec::new());
    // The encoder rejects quality 0.
    JpegEncoder::new_with_quality(&mut buf, quality.max(1))
        .encode_image(&rgb)
        .map_err(|e| GalleryError::ImageProcessing(e.to_string()))?;
    Ok(buf.into_inner())
}

impl CaptureService for FileImportCapture {
    fn capture<'a>(&'a self, request: &'a CaptureRequest) -> ServiceFuture<'a, CapturedImage> {
        Box::pin(async move {
            debug!(source = %self.source.display(), quality = request.quality, "Capturing from file");
            if request.result_format != ResultFormat::Uri {
                return Err(GalleryError::CaptureFailed(format!(
                    "file import only produces URI results, not {:?}",
                    request.result_format
                )));
            }

            let source = self.source.clone();
            let quality = request.quality;
            let bytes = tokio::task::spawn_blocking(move || encode_jpeg(&source, quality))
                .await
                .map_err(|e| GalleryError::CaptureFailed(e.to_string()))??;

            tokio::fs::create_dir_all(&self.scratch_dir).await.map_err(|e| {
                GalleryError::CaptureFailed(format!(
                    "Failed to create {}: {e}",
                    self.scratch_dir.display()
                ))
            })?;
            let target = self.scratch_dir.join(format!(
                "{SCRATCH_PREFIX}{}",
                self.namer.next_name(CAPTURE_FORMAT)
            ));
            tokio::fs::write(&target, &bytes)
                .await
                .map_err(|e| GalleryError::CaptureFailed(e.to_string()))?;

            info!(path = %target.display(), bytes = bytes.len(), "Captured image");

            let web_path = file_uri(&target);
            let local_path = match self.mode {
                ExecutionMode::Native => Some(target.display().to_string()),
                ExecutionMode::Web => None,
            };
            Ok(CapturedImage {
                local_path,
                web_path: Some(web_path),
                format: CAPTURE_FORMAT.to_string(),
            })
        })
    }

    fn release<'a>(&'a self, image: &'a CapturedImage) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            let mut paths: Vec<PathBuf> = [&image.local_path, &image.web_path]
                .into_iter()
                .flatten()
                .filter_map(|p| self.scratch_file(p))
                .collect();
            paths.dedup();

            for path in paths {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => trace!(path = %path.display(), "Released capture"),
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => {
                        return Err(GalleryError::CaptureFailed(format!(
                            "Failed to release {}: {e}",
                            path.display()
                        )));
                    }
                }
            }
            Ok(())
        })
    }
}

/// Capture service for commands that never capture.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCapture;

impl CaptureService for UnavailableCapture {
    fn capture<'a>(&'a self, _request: &'a CaptureRequest) -> ServiceFuture<'a, CapturedImage> {
        Box::pin(async {
            Err(GalleryError::CaptureFailed(
                "no capture source configured".to_string(),
            ))
        })
    }
}

/// Fetches `data:` URIs, `file://` URIs and plain paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalResourceFetcher;

/// Decode the payload of a `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let fail = |reason: &str| GalleryError::Fetch {
        path: uri.chars().take(48).collect(),
        reason: reason.to_string(),
    };

    let body = uri.strip_prefix("data:").ok_or_else(|| fail("not a data URI"))?;
    let (meta, payload) = body.split_once(',').ok_or_else(|| fail("missing payload"))?;
    if !meta.ends_with(";base64") {
        return Err(fail("only base64 data URIs are supported"));
    }
    STANDARD.decode(payload).map_err(|e| fail(&e.to_string()))
}

impl ResourceFetcher for LocalResourceFetcher {
    fn fetch<'a>(&'a self, web_path: &'a str) -> ServiceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            if web_path.starts_with("data:") {
                return decode_data_uri(web_path);
            }

            let path = web_path.strip_prefix("file://").unwrap_or(web_path);
            let bytes = tokio::fs::read(path).await.map_err(|e| GalleryError::Fetch {
                path: web_path.to_string(),
                reason: e.to_string(),
            })?;
            trace!(path, bytes = bytes.len(), "Fetched resource");
            Ok(bytes)
        })
    }
}
