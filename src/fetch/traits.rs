//! fetch::traits
//!
//! Fetcher trait for materializing a remote tree locally.
//!
//! # Design
//!
//! The `Fetcher` trait is async because fetching involves network I/O.
//! Every call stages into its own temporary directory, so unrelated
//! invocations never share a staging area. The staging directory lives as
//! long as the returned [`StagedTree`].

use std::fmt;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;
use thiserror::Error;

use crate::core::source::SourceDescriptor;

/// Errors from fetch operations.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The repository, ref or path does not exist (or is not accessible).
    #[error("not found: {0}")]
    NotFound(String),

    /// Network or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Local staging failed.
    #[error("staging error: {0}")]
    Io(String),

    /// Unexpected failure inside the fetcher.
    #[error("fetch failed: {0}")]
    Internal(String),
}

/// A fetched tree on local disk.
pub struct StagedTree {
    root: PathBuf,
    _staging: TempDir,
}

impl StagedTree {
    /// Wrap `root`, which must live inside `staging`.
    pub fn new(root: PathBuf, staging: TempDir) -> Self {
        Self {
            root,
            _staging: staging,
        }
    }

    /// Directory to discover workflows in.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl fmt::Debug for StagedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedTree")
            .field("root", &self.root)
            .finish()
    }
}

/// Retrieves the content tree a source descriptor points at.
///
/// # Errors
///
/// - `NotFound`: repository, ref or subpath does not exist
/// - `Network`: the remote could not be reached
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Materialize `source` into a fresh staging directory.
    async fn fetch(&self, source: &SourceDescriptor) -> Result<StagedTree, FetchError>;
}

/// Narrow a checked-out tree to the source's subpath.
///
/// A directory subpath becomes the root itself. A file subpath is copied
/// alone into `file_stage`, which then becomes the root, so the file is
/// found as a root-level template.
pub(crate) fn select_subpath(
    checkout: &Path,
    subpath: Option<&str>,
    file_stage: &Path,
) -> Result<PathBuf, FetchError> {
    let Some(subpath) = subpath else {
        return Ok(checkout.to_path_buf());
    };

    let relative = Path::new(subpath);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(FetchError::NotFound(format!(
            "path '{}' is outside the repository",
            subpath
        )));
    }

    let target = checkout.join(relative);
    if target.is_dir() {
        return Ok(target);
    }
    if target.is_file() {
        let file_name = target
            .file_name()
            .ok_or_else(|| FetchError::NotFound(format!("path '{}'", subpath)))?;
        std::fs::create_dir_all(file_stage).map_err(|e| FetchError::Io(e.to_string()))?;
        std::fs::copy(&target, file_stage.join(file_name))
            .map_err(|e| FetchError::Io(e.to_string()))?;
        return Ok(file_stage.to_path_buf());
    }

    Err(FetchError::NotFound(format!("path '{}'", subpath)))
}
