//! engine::report
//!
//! Per-file outcomes of a run and their aggregate.
//!
//! Every merge launched by a run settles into a [`FileOutcome`]. The
//! [`SyncReport`] succeeds only if every outcome did; files that were written
//! before a sibling failed stay written.

use std::path::{Path, PathBuf};

use crate::core::errors::GhatError;
use crate::ui::output::{self, Verbosity};

/// The settled result of one file's pipeline.
#[derive(Debug)]
pub struct FileOutcome {
    /// The local workflow the pipeline targeted
    pub workflow: PathBuf,
    /// The path written, or why it was not
    pub result: Result<PathBuf, GhatError>,
}

impl FileOutcome {
    pub fn new(workflow: impl Into<PathBuf>, result: Result<PathBuf, GhatError>) -> Self {
        Self {
            workflow: workflow.into(),
            result,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// All outcomes of a run, in launch order.
#[derive(Debug, Default)]
pub struct SyncReport {
    outcomes: Vec<FileOutcome>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    /// Absorb the outcomes of another run.
    pub fn extend(&mut self, other: SyncReport) {
        self.outcomes.extend(other.outcomes);
    }

    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    /// Paths that were written successfully.
    pub fn written(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_success)
    }

    /// Collapse into the written paths, or the first failure.
    ///
    /// Failures after the first are reported as warnings so none goes
    /// unseen.
    pub fn into_result(self, verbosity: Verbosity) -> Result<Vec<PathBuf>, GhatError> {
        let mut written = Vec::new();
        let mut first_error = None;
        for outcome in self.outcomes {
            match outcome.result {
                Ok(path) => written.push(path),
                Err(err) if first_error.is_none() => first_error = Some(err),
                Err(err) => output::warn(
                    format!("{}: {}", outcome.workflow.display(), err),
                    verbosity,
                ),
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(written),
        }
    }
}

impl From<Vec<FileOutcome>> for SyncReport {
    fn from(outcomes: Vec<FileOutcome>) -> Self {
        Self { outcomes }
    }
}
