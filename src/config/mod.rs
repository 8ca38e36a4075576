//! Gallery configuration.
//!
//! Settings come from an optional TOML file. Every field has a default, so a
//! missing default config file is not an error. `data_dir` may use `~` and is
//! resolved relative to the config file.
//!
//! ```toml
//! mode = "native"
//! data_dir = "~/Pictures/gallery"
//! storage_key = "photos"
//! file_extension = "jpeg"
//! quality = 90
//! server_url = "http://localhost"
//! ```

mod path;

pub use path::{APP_DIR, default_config_path, default_data_dir, home_dir, resolve_path};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::{DEFAULT_SERVER_URL, select_backend};
use crate::controller::{
    DEFAULT_FILE_EXTENSION, DEFAULT_STORAGE_KEY, GalleryOptions, GalleryServices, PhotoGallery,
};
use crate::error::{GalleryError, Result};
use crate::services::{
    CaptureService, ExecutionMode, FsFileStore, LocalResourceFetcher, SqliteKvStore,
};

/// File name of the key-value database inside the data directory.
pub const DB_FILE: &str = "storage.db";

/// Effective gallery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Execution mode.
    pub mode: ExecutionMode,
    /// Root for the database and stored files.
    pub data_dir: Option<PathBuf>,
    /// Key the gallery list is stored under.
    pub storage_key: String,
    /// Extension for captured files.
    pub file_extension: String,
    /// JPEG quality for captures (0-100).
    pub quality: u8,
    /// Origin native display paths are served from.
    pub server_url: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Native,
            data_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            quality: 100,
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl GalleryConfig {
    /// Load configuration.
    ///
    /// With `explicit`, the file must exist. Without it, the default location
    /// is tried and defaults are used when it is absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path()?, false),
        };

        if !path.exists() {
            if required {
                return Err(GalleryError::ConfigNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&text, path.parent().unwrap_or_else(|| Path::new(".")))?;
        info!(path = %path.display(), mode = config.mode.as_str(), "Configuration loaded");
        Ok(config)
    }

    /// Parse TOML, resolving `data_dir` against `config_dir`.
    pub fn from_toml(text: &str, config_dir: &Path) -> Result<Self> {
        let mut config: Self =
            toml::from_str(text).map_err(|e| GalleryError::ConfigParse(e.to_string()))?;
        if let Some(dir) = config.data_dir.take() {
            config.data_dir = Some(resolve_path(&dir, config_dir)?);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.quality > 100 {
            return Err(GalleryError::InvalidQuality {
                value: self.quality,
            });
        }
        if self.storage_key.trim().is_empty() {
            return Err(GalleryError::ConfigInvalid(
                "storage_key must not be empty".to_string(),
            ));
        }
        let ext = &self.file_extension;
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GalleryError::ConfigInvalid(format!(
                "file_extension must be alphanumeric, got '{ext}'"
            )));
        }
        Ok(())
    }

    /// Data directory, falling back to the platform default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    /// Directory backing the file store's `Data` area.
    pub fn files_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("files"))
    }

    /// Directory backing the file store's `Cache` area.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("cache"))
    }

    /// Directory the file-import capture writes transient captures to.
    pub fn scratch_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("scratch"))
    }

    /// Key-value database path.
    pub fn db_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(DB_FILE))
    }

    /// Controller options derived from this configuration.
    #[must_use]
    pub fn gallery_options(&self) -> GalleryOptions {
        GalleryOptions {
            storage_key: self.storage_key.clone(),
            file_extension: self.file_extension.clone(),
            quality: self.quality,
            ..GalleryOptions::default()
        }
    }

    /// Open the on-disk stores and select the backend for this mode.
    pub fn build_services(&self, capture: Arc<dyn CaptureService>) -> Result<GalleryServices> {
        let files = Arc::new(FsFileStore::new(self.files_dir()?, self.cache_dir()?)?);
        let kv = Arc::new(SqliteKvStore::open(self.db_path()?)?);
        let backend = select_backend(
            self.mode,
            files.clone(),
            Arc::new(LocalResourceFetcher),
            &self.server_url,
        );
        debug!(data_dir = %self.data_dir()?.display(), "Services opened");
        Ok(GalleryServices {
            capture,
            files,
            kv,
            backend,
        })
    }

    /// Build a gallery controller. The caller still has to initialize it.
    pub fn build_gallery(&self, capture: Arc<dyn CaptureService>) -> Result<PhotoGallery> {
        Ok(PhotoGallery::new(
            self.build_services(capture)?,
            self.gallery_options(),
        ))
    }
}
