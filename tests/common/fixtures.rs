//! Test fixture helpers for creating temporary test data.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tempfile::TempDir;

/// A scratch workspace holding source images and a gallery data directory.
///
/// Everything is removed when the value is dropped.
pub struct TestWorkspace {
    pub dir: TempDir,
}

impl TestWorkspace {
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory the gallery stores its database and files in.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("gallery")
    }

    /// Write a solid-color PNG source image and return its path.
    ///
    /// # Panics
    ///
    /// Panics if the image cannot be saved.
    #[must_use]
    pub fn source_image(&self, name: &str, color: [u8; 3]) -> PathBuf {
        let path = self.dir.path().join(name);
        RgbImage::from_pixel(24, 16, Rgb(color))
            .save(&path)
            .unwrap_or_else(|e| panic!("Failed to save image at {path:?}: {e}"));
        path
    }

    /// Write a config file and return its path.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn config_file(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("Failed to write config");
        path
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal valid JPEG bytes produced by the image crate.
///
/// # Panics
///
/// Panics if encoding fails.
#[must_use]
pub fn jpeg_bytes(color: [u8; 3]) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    RgbImage::from_pixel(4, 4, Rgb(color))
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .expect("Failed to encode JPEG");
    buf.into_inner()
}
