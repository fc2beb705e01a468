//! fetch::mock
//!
//! Mock fetcher for deterministic testing.
//!
//! # Design
//!
//! Trees are registered per canonical URL as fixture directories on disk.
//! Each fetch copies the fixture into its own temporary directory, so a test
//! can never observe a previous run's staging area. Requests are recorded
//! for verification.
//!
//! # Example
//!
//! ```
//! use ghat::core::source::SourceDescriptor;
//! use ghat::fetch::mock::MockFetcher;
//! use ghat::fetch::Fetcher;
//!
//! # tokio_test::block_on(async {
//! let fixture = tempfile::TempDir::new().unwrap();
//! std::fs::write(fixture.path().join("ci.yml"), "on: push\n").unwrap();
//!
//! let fetcher = MockFetcher::new().with_tree("https://github.com/owner/repo", fixture.path());
//! let source = SourceDescriptor::parse("owner/repo").unwrap();
//! let staged = fetcher.fetch(&source).await.unwrap();
//!
//! assert!(staged.root().join("ci.yml").is_file());
//! assert_eq!(fetcher.requests().len(), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::traits::{select_subpath, FetchError, Fetcher, StagedTree};
use crate::core::source::SourceDescriptor;

/// Mock fetcher for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    inner: Arc<Mutex<MockFetcherInner>>,
}

#[derive(Debug, Default)]
struct MockFetcherInner {
    /// Fixture directories by canonical URL.
    trees: HashMap<String, PathBuf>,
    /// Error returned by every fetch, if set.
    fail_with: Option<FetchError>,
    /// Sources requested so far.
    requests: Vec<SourceDescriptor>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `fixture` for sources whose canonical URL is `url`.
    pub fn with_tree(self, url: impl Into<String>, fixture: impl Into<PathBuf>) -> Self {
        self.lock().trees.insert(url.into(), fixture.into());
        self
    }

    /// Fail every fetch with `error`.
    pub fn fail_with(self, error: FetchError) -> Self {
        self.lock().fail_with = Some(error);
        self
    }

    /// Sources fetched so far, in request order.
    pub fn requests(&self) -> Vec<SourceDescriptor> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockFetcherInner> {
        // A poisoned lock only means another test thread panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<StagedTree, FetchError> {
        let fixture = {
            let mut inner = self.lock();
            inner.requests.push(source.clone());
            if let Some(err) = &inner.fail_with {
                return Err(err.clone());
            }
            inner
                .trees
                .get(&source.url)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(format!("repository {}", source.url)))?
        };

        let staging = tempfile::Builder::new()
            .prefix("ghat-mock-")
            .tempdir()
            .map_err(|e| FetchError::Io(e.to_string()))?;
        let checkout = staging.path().join("checkout");
        copy_dir(&fixture, &checkout).map_err(|e| FetchError::Io(e.to_string()))?;

        let root = select_subpath(
            &checkout,
            source.subpath.as_deref(),
            &staging.path().join("file"),
        )?;
        Ok(StagedTree::new(root, staging))
    }
}

fn copy_dir(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}
