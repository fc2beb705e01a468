//! fetch::git
//!
//! Fetcher implementation that clones with libgit2.
//!
//! # Design
//!
//! The repository is cloned from its canonical HTTPS URL into a fresh
//! temporary directory. libgit2 is blocking, so the clone runs on tokio's
//! blocking pool while the caller's task stays suspended at the fetch
//! boundary.
//!
//! # Refs
//!
//! - `HEAD`: the clone's default branch is used as-is
//! - anything else: resolved as a remote branch first (`origin/<ref>`), then
//!   as a tag or commit, and checked out detached
//!
//! Hosts answer clones of missing or private repositories with an
//! authentication challenge; both surface as [`FetchError::NotFound`].

use std::path::Path;

use async_trait::async_trait;

use super::traits::{select_subpath, FetchError, Fetcher, StagedTree};
use crate::core::source::{SourceDescriptor, DEFAULT_REF};

/// Production fetcher backed by `git2`.
#[derive(Debug, Clone, Default)]
pub struct GitFetcher;

impl GitFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Fetcher for GitFetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<StagedTree, FetchError> {
        let url = source.url.clone();
        let git_ref = source.git_ref.clone();
        let subpath = source.subpath.clone();

        tokio::task::spawn_blocking(move || clone_tree(&url, &git_ref, subpath.as_deref()))
            .await
            .map_err(|e| FetchError::Internal(e.to_string()))?
    }
}

/// Clone `url`, check out `git_ref` and narrow to `subpath`.
///
/// `url` may be anything libgit2 can clone from, including a local path.
pub fn clone_tree(
    url: &str,
    git_ref: &str,
    subpath: Option<&str>,
) -> Result<StagedTree, FetchError> {
    let staging = tempfile::Builder::new()
        .prefix("ghat-")
        .tempdir()
        .map_err(|e| FetchError::Io(e.to_string()))?;
    let checkout = staging.path().join("checkout");

    let repo = git2::build::RepoBuilder::new()
        .clone(url, &checkout)
        .map_err(|e| map_clone_error(e, url))?;

    if git_ref != DEFAULT_REF {
        checkout_ref(&repo, git_ref)?;
    }

    let root = select_subpath(&checkout, subpath, &staging.path().join("file"))?;
    Ok(StagedTree::new(root, staging))
}

fn checkout_ref(repo: &git2::Repository, git_ref: &str) -> Result<(), FetchError> {
    let object = repo
        .revparse_single(&format!("origin/{}", git_ref))
        .or_else(|_| repo.revparse_single(git_ref))
        .map_err(|_| FetchError::NotFound(format!("ref '{}'", git_ref)))?;
    let commit = object
        .peel_to_commit()
        .map_err(|_| FetchError::NotFound(format!("ref '{}' is not a commit", git_ref)))?;

    let mut checkout = git2::build::CheckoutBuilder::new();
    checkout.force();
    repo.checkout_tree(commit.as_object(), Some(&mut checkout))
        .map_err(|e| FetchError::Internal(e.message().to_string()))?;
    repo.set_head_detached(commit.id())
        .map_err(|e| FetchError::Internal(e.message().to_string()))?;
    Ok(())
}

fn map_clone_error(err: git2::Error, url: &str) -> FetchError {
    match (err.code(), err.class()) {
        (git2::ErrorCode::NotFound, _) | (git2::ErrorCode::Auth, _) => {
            FetchError::NotFound(format!("repository {}", url))
        }
        (_, git2::ErrorClass::Net)
        | (_, git2::ErrorClass::Http)
        | (_, git2::ErrorClass::Ssl)
        | (_, git2::ErrorClass::Ssh) => FetchError::Network(err.message().to_string()),
        _ if !is_remote(url) && !Path::new(url).exists() => {
            FetchError::NotFound(format!("repository {}", url))
        }
        _ => FetchError::Internal(err.message().to_string()),
    }
}

fn is_remote(url: &str) -> bool {
    url.contains("://") || url.starts_with("git@")
}
