//! Error types for photo gallery operations.

use thiserror::Error;

/// Primary error type for gallery operations.
#[derive(Error, Debug)]
pub enum GalleryError {
    // Capture errors
    #[error("Capture cancelled by user")]
    CaptureCancelled,

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Captured image has no {expected} path for this execution mode")]
    MissingCapturePath { expected: &'static str },

    #[error("Capture source not found: {path}")]
    SourceNotFound { path: String },

    // File store errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("File store {op} failed for '{path}': {reason}")]
    FileStore {
        op: &'static str,
        path: String,
        reason: String,
    },

    #[error("Failed to fetch resource '{path}': {reason}")]
    Fetch { path: String, reason: String },

    // Key-value store errors
    #[error("Key-value store error: {0}")]
    KeyValue(String),

    #[error("Stored gallery under key '{key}' is malformed: {reason}")]
    MalformedGallery { key: String, reason: String },

    // Record errors
    #[error("No photo with filepath: {filepath}")]
    RecordNotFound { filepath: String },

    // Image errors
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Invalid quality value {value}: must be 0-100")]
    InvalidQuality { value: u8 },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl GalleryError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CaptureCancelled
                | Self::SourceNotFound { .. }
                | Self::RecordNotFound { .. }
                | Self::InvalidQuality { .. }
                | Self::ConfigNotFound { .. }
                | Self::ConfigInvalid(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::CaptureCancelled => Some("Run the capture again when ready"),
            Self::SourceNotFound { .. } => Some("Check the path to the source image"),
            Self::RecordNotFound { .. } => Some("Run: gallery list"),
            Self::InvalidQuality { .. } => Some("Use a value between 0 and 100"),
            Self::ConfigNotFound { .. } => Some("Check --config or GALLERY_CONFIG"),
            Self::MalformedGallery { .. } => {
                Some("Inspect the storage database; the stored list is not valid JSON")
            }
            Self::MissingCapturePath { .. } => Some("Check --mode matches the capture source"),
            _ => None,
        }
    }

    /// Returns true if this is a not-found error from the file store.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }
}

/// Convenience type alias for Results using GalleryError.
pub type Result<T> = std::result::Result<T, GalleryError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| GalleryError::Other(format!("{}: {e}", f().into())))
    }
}
