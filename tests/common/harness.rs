//! A gallery wired to mock collaborators.

use std::sync::Arc;

use gallery::backend::{DEFAULT_SERVER_URL, MediaBackend, select_backend};
use gallery::controller::{GalleryOptions, GalleryServices, PhotoGallery};
use gallery::services::ExecutionMode;
use gallery::services::mock::{MockCapture, MockFetcher, MockFileStore, MockKvStore};

/// Mocks shared between a test and the gallery under test.
pub struct MockHarness {
    pub capture: Arc<MockCapture>,
    pub files: Arc<MockFileStore>,
    pub kv: Arc<MockKvStore>,
    pub fetcher: Arc<MockFetcher>,
}

impl MockHarness {
    #[must_use]
    pub fn new() -> Self {
        Self::with_kv(MockKvStore::new())
    }

    #[must_use]
    pub fn with_kv(kv: MockKvStore) -> Self {
        Self {
            capture: Arc::new(MockCapture::new()),
            files: Arc::new(MockFileStore::new()),
            kv: Arc::new(kv),
            fetcher: Arc::new(MockFetcher::new()),
        }
    }

    #[must_use]
    pub fn backend(&self, mode: ExecutionMode) -> Arc<dyn MediaBackend> {
        select_backend(
            mode,
            self.files.clone(),
            self.fetcher.clone(),
            DEFAULT_SERVER_URL,
        )
    }

    #[must_use]
    pub fn gallery(&self, mode: ExecutionMode) -> PhotoGallery {
        PhotoGallery::new(
            GalleryServices {
                capture: self.capture.clone(),
                files: self.files.clone(),
                kv: self.kv.clone(),
                backend: self.backend(mode),
            },
            GalleryOptions::default(),
        )
    }
}

impl Default for MockHarness {
    fn default() -> Self {
        Self::new()
    }
}
