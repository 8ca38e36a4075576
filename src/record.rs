//! Photo records and their persisted form.
//!
//! A [`PhotoRecord`] is the only entity the gallery manages. Its durable
//! identity is `filepath`; `display_path` is a runtime-resolved location and
//! `inline_content` is a data URI rebuilt on every load when needed. The
//! persisted list is the JSON array produced by [`encode_gallery`], which never
//! carries inline content.

use std::sync::atomic::{AtomicI64, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{GalleryError, Result};

/// A single photo's metadata entry in the gallery list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    /// Stable identifier and file store key.
    pub filepath: String,
    /// Directly displayable URI or path, if one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_path: Option<String>,
    /// Inline `data:` URI of the image content. Never serialized.
    #[serde(skip)]
    pub inline_content: Option<String>,
}

impl PhotoRecord {
    /// Create a record with no display path and no inline content.
    #[must_use]
    pub fn new(filepath: impl Into<String>) -> Self {
        Self {
            filepath: filepath.into(),
            display_path: None,
            inline_content: None,
        }
    }

    /// Attach a display path.
    #[must_use]
    pub fn with_display_path(mut self, display_path: impl Into<String>) -> Self {
        self.display_path = Some(display_path.into());
        self
    }

    /// The bare file name: everything after the last `/` of `filepath`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        bare_file_name(&self.filepath)
    }

    /// Copy of this record with every non-durable field removed.
    #[must_use]
    pub fn durable(&self) -> Self {
        Self {
            filepath: self.filepath.clone(),
            display_path: self.display_path.clone(),
            inline_content: None,
        }
    }
}

/// Substring after the last `/`, or the whole string if there is none.
#[must_use]
pub fn bare_file_name(filepath: &str) -> &str {
    filepath
        .rsplit_once('/')
        .map_or(filepath, |(_, name)| name)
}

/// Serialize the durable projection of a gallery list.
pub fn encode_gallery(records: &[PhotoRecord]) -> Result<String> {
    let durable: Vec<PhotoRecord> = records.iter().map(PhotoRecord::durable).collect();
    let raw = serde_json::to_string(&durable)
        .map_err(|e| GalleryError::Other(format!("Failed to serialize gallery: {e}")))?;
    trace!(count = durable.len(), bytes = raw.len(), "Encoded gallery");
    Ok(raw)
}

/// Deserialize a stored gallery list.
///
/// An absent or empty value yields an empty list.
pub fn decode_gallery(raw: Option<&str>, key: &str) -> Result<Vec<PhotoRecord>> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        debug!(key, "No stored gallery, starting empty");
        return Ok(Vec::new());
    };

    serde_json::from_str(raw).map_err(|e| GalleryError::MalformedGallery {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// MIME subtype for a file extension.
#[must_use]
pub fn image_subtype(extension: &str) -> String {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "jpeg".to_string(),
        "tif" => "tiff".to_string(),
        other => other.to_string(),
    }
}

/// Encode raw image bytes as a `data:` URI.
#[must_use]
pub fn inline_data_uri(bytes: &[u8], extension: &str) -> String {
    format!(
        "data:image/{};base64,{}",
        image_subtype(extension),
        STANDARD.encode(bytes)
    )
}

/// Generates timestamp-derived file names.
///
/// Names are `{unix_millis}.{extension}`. If the clock has not advanced since
/// the previous name, the timestamp is bumped so names stay unique per namer.
#[derive(Debug, Default)]
pub struct FileNamer {
    last_millis: AtomicI64,
}

impl FileNamer {
    /// Create a namer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unique file name for the given extension.
    pub fn next_name(&self, extension: &str) -> String {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last_millis.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(prev + 1);
            match self.last_millis.compare_exchange(
                prev,
                candidate,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return format!("{candidate}.{extension}"),
                Err(actual) => prev = actual,
            }
        }
    }
}
