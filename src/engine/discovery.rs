//! engine::discovery
//!
//! Locating the workflow files of a tree.
//!
//! # Tiers
//!
//! 1. `.yml`/`.yaml` files directly at the root: a template repository
//! 2. otherwise, the same inside `.github/workflows/`: a regular repository
//!    whose deployed workflows are borrowed
//!
//! Results keep directory enumeration order and are relative to the root. A
//! missing directory at either tier counts as zero files; an empty result is
//! left for the caller to judge.

use std::path::{Path, PathBuf};

use crate::core::errors::GhatError;

/// Conventional location of deployed workflows inside a repository.
pub const WORKFLOWS_SUBDIR: &str = ".github/workflows";

/// Discover the workflow files of the tree at `root`.
pub async fn discover(root: &Path) -> Result<Vec<PathBuf>, GhatError> {
    let templates = find_yaml_files(root, Path::new("")).await?;
    if !templates.is_empty() {
        return Ok(templates);
    }

    find_yaml_files(root, Path::new(WORKFLOWS_SUBDIR)).await
}

/// List YAML files in `root/sub`, returned as `sub/<name>`.
pub async fn find_yaml_files(root: &Path, sub: &Path) -> Result<Vec<PathBuf>, GhatError> {
    let dir = root.join(sub);
    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(GhatError::io(dir, e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| GhatError::io(&dir, e))?
    {
        let name = PathBuf::from(entry.file_name());
        if !is_yaml(&name) {
            continue;
        }
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| GhatError::io(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }
        files.push(sub.join(name));
    }
    Ok(files)
}

fn is_yaml(name: &Path) -> bool {
    matches!(
        name.extension().and_then(|ext| ext.to_str()),
        Some("yml") | Some("yaml")
    )
}
