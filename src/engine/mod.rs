//! engine
//!
//! Orchestrates a ghat run: Parse -> Fetch -> Discover -> Merge, or Recover
//! -> Replay when no source is given.
//!
//! # Architecture
//!
//! ```text
//! source given:  SourceDescriptor -> Fetcher -> discover -> merge::apply (per file)
//! no source:     resync::recover -> dedupe -> sync each recovered source
//! ```
//!
//! Every per-file merge is launched concurrently and the run waits for all of
//! them to settle. The outcome of each file is collected into a
//! [`SyncReport`]; the run succeeds only when every file succeeded.
//!
//! # Invariants
//!
//! - Options are validated once, when the [`SyncRequest`] is built
//! - Each file reads its own pair of documents and writes its own output path
//! - Files already written when a sibling fails are not rolled back
//!
//! # Example
//!
//! ```ignore
//! use ghat::engine::{Context, Engine, SyncRequest};
//! use ghat::fetch::GitFetcher;
//!
//! let request = SyncRequest::new(Some("owner/repo".into()), vec![], vec![], false)?;
//! let fetcher = GitFetcher::new();
//! let report = Engine::new(Context::default(), &fetcher).run(&request).await?;
//! report.into_result(Verbosity::Normal)?;
//! ```

pub mod discovery;
pub mod merge;
pub mod report;
pub mod resync;
pub mod runner;

pub use merge::MergeJob;
pub use report::{FileOutcome, SyncReport};
pub use runner::{Engine, ReplayParser};

use std::path::PathBuf;

use crate::core::config::DEFAULT_WORKFLOWS_DIR;
use crate::core::errors::GhatError;
use crate::core::options::MergeOptions;
use crate::core::source::Host;
use crate::ui::output::Verbosity;

/// Execution context for a run.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Where generated workflows are written, relative to the root.
    pub workflows_dir: PathBuf,
    /// Host assumed for sources without a host prefix.
    pub default_host: Host,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            workflows_dir: PathBuf::from(DEFAULT_WORKFLOWS_DIR),
            default_host: Host::default(),
        }
    }
}

impl Context {
    /// The repository root the run operates on.
    pub fn root(&self) -> PathBuf {
        self.cwd.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// The directory generated workflows are written to.
    pub fn local_workflows_dir(&self) -> PathBuf {
        self.root().join(&self.workflows_dir)
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// What the caller asked for: a source to sync, or a resync of what is
/// already there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Source string; `None` selects resync mode
    pub source: Option<String>,
    /// Validated merge options
    pub options: MergeOptions,
}

impl SyncRequest {
    /// Validate raw caller input.
    ///
    /// # Errors
    ///
    /// [`GhatError::Input`] when options are given without a source, when
    /// `verbatim` is combined with `exclude`/`set`, or when an entry is
    /// malformed.
    pub fn new(
        source: Option<String>,
        exclude: Vec<String>,
        set: Vec<String>,
        verbatim: bool,
    ) -> Result<Self, GhatError> {
        if source.is_none() && (verbatim || !exclude.is_empty() || !set.is_empty()) {
            return Err(GhatError::input(
                "If you don't specify a source, any further options won't be applied",
            ));
        }

        Ok(Self {
            source,
            options: MergeOptions::new(exclude, set, verbatim)?,
        })
    }

    /// A resync request.
    pub fn resync() -> Self {
        Self {
            source: None,
            options: MergeOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_without_source_rejected() {
        let err = SyncRequest::new(None, vec!["jobs.Test".into()], vec![], false).unwrap_err();
        assert!(err.is_user_error());
        assert!(err.to_string().contains("don't specify a source"));

        let err = SyncRequest::new(None, vec![], vec![], true).unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn bare_request_is_resync() {
        assert_eq!(
            SyncRequest::new(None, vec![], vec![], false).unwrap(),
            SyncRequest::resync()
        );
    }

    #[test]
    fn verbatim_conflict_surfaces() {
        let err = SyncRequest::new(
            Some("owner/repo".into()),
            vec![],
            vec!["on=push".into()],
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("`verbatim`"));
    }

    #[test]
    fn context_paths() {
        let ctx = Context {
            cwd: Some(PathBuf::from("/work")),
            ..Context::default()
        };
        assert_eq!(ctx.root(), PathBuf::from("/work"));
        assert_eq!(
            ctx.local_workflows_dir(),
            PathBuf::from("/work/.github/workflows")
        );
        assert_eq!(Context::default().root(), PathBuf::from("."));
    }
}
