//! Filesystem-backed file store.
//!
//! Each [`Directory`] maps to a base path on disk. Writes resolve to absolute
//! `file://` URIs.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};

use super::{Directory, FileStore, ServiceFuture, WriteResult};
use crate::error::{GalleryError, Result};

const FILE_SCHEME: &str = "file://";

/// File store rooted in local directories.
#[derive(Debug, Clone)]
pub struct FsFileStore {
    data_root: PathBuf,
    cache_root: PathBuf,
}

impl FsFileStore {
    /// Create a store. Relative roots are made absolute against the current directory.
    pub fn new(data_root: impl AsRef<Path>, cache_root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            data_root: std::path::absolute(data_root.as_ref())?,
            cache_root: std::path::absolute(cache_root.as_ref())?,
        })
    }

    /// Base path for a directory.
    #[must_use]
    pub fn root(&self, directory: Directory) -> &Path {
        match directory {
            Directory::Data => &self.data_root,
            Directory::Cache => &self.cache_root,
        }
    }

    /// Resolve a store path to a location on disk.
    ///
    /// `file://` URIs are used as-is regardless of directory. Relative paths
    /// must stay inside the directory root.
    pub fn resolve(&self, path: &str, directory: Option<Directory>) -> Result<PathBuf> {
        if let Some(rest) = path.strip_prefix(FILE_SCHEME) {
            return Ok(PathBuf::from(rest));
        }

        let Some(directory) = directory else {
            return Ok(PathBuf::from(path));
        };

        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(GalleryError::FileStore {
                op: "resolve",
                path: path.to_string(),
                reason: "path must be relative to the store directory".to_string(),
            });
        }

        Ok(self.root(directory).join(relative))
    }
}

/// URI for an absolute filesystem path.
#[must_use]
pub fn file_uri(path: &Path) -> String {
    format!("{FILE_SCHEME}{}", path.display())
}

fn map_io(op: &'static str, path: &Path, err: &std::io::Error) -> GalleryError {
    if err.kind() == ErrorKind::NotFound {
        GalleryError::FileNotFound {
            path: path.display().to_string(),
        }
    } else {
        GalleryError::FileStore {
            op,
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl FileStore for FsFileStore {
    fn write<'a>(
        &'a self,
        path: &'a str,
        data: &'a [u8],
        directory: Directory,
    ) -> ServiceFuture<'a, WriteResult> {
        Box::pin(async move {
            let target = self.resolve(path, Some(directory))?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| map_io("write", parent, &e))?;
            }
            tokio::fs::write(&target, data)
                .await
                .map_err(|e| map_io("write", &target, &e))?;

            let resolved_uri = file_uri(&target);
            debug!(uri = %resolved_uri, "File written");
            Ok(WriteResult { resolved_uri })
        })
    }

    fn read<'a>(
        &'a self,
        path: &'a str,
        directory: Option<Directory>,
    ) -> ServiceFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let target = self.resolve(path, directory)?;
            let data = tokio::fs::read(&target)
                .await
                .map_err(|e| map_io("read", &target, &e))?;
            trace!(path = %target.display(), bytes = data.len(), "File read");
            Ok(data)
        })
    }

    fn delete<'a>(&'a self, path: &'a str, directory: Directory) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            let target = self.resolve(path, Some(directory))?;
            tokio::fs::remove_file(&target)
                .await
                .map_err(|e| map_io("delete", &target, &e))?;
            debug!(path = %target.display(), "File deleted");
            Ok(())
        })
    }

    fn exists<'a>(
        &'a self,
        path: &'a str,
        directory: Option<Directory>,
    ) -> ServiceFuture<'a, bool> {
        Box::pin(async move {
            let target = self.resolve(path, directory)?;
            match tokio::fs::metadata(&target).await {
                Ok(meta) => Ok(meta.is_file()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(map_io("stat", &target, &e)),
            }
        })
    }

    fn list(&self, directory: Directory) -> ServiceFuture<'_, Vec<String>> {
        Box::pin(async move {
            let root = self.root(directory);
            let mut entries = match tokio::fs::read_dir(root).await {
                Ok(entries) => entries,
                // Nothing written yet.
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(map_io("list", root, &e)),
            };

            let mut names = Vec::new();
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| map_io("list", root, &e))?
            {
                let is_file = entry
                    .file_type()
                    .await
                    .map_err(|e| map_io("list", &entry.path(), &e))?
                    .is_file();
                if is_file {
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
            names.sort();
            trace!(root = %root.display(), count = names.len(), "Directory listed");
            Ok(names)
        })
    }
}
