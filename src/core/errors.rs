//! core::errors
//!
//! Error taxonomy for a ghat run.
//!
//! # Categories
//!
//! - **User-correctable**: [`GhatError::Input`], [`GhatError::BadSource`],
//!   [`GhatError::UnsupportedHost`]. The binary renders these as a one-line
//!   message without a fault trace.
//! - **Per-file**: [`GhatError::Parse`] aborts the pipeline of the file it
//!   names; sibling files are unaffected.
//! - **Environment**: [`GhatError::Io`] and [`GhatError::Transport`] carry the
//!   underlying cause and are printed with full detail.
//!
//! Missing files are never errors here: document loading normalizes absence
//! to an empty document before any of these variants could be produced.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::source::SourceError;
use crate::fetch::FetchError;

/// Errors produced by the template-merge engine.
#[derive(Debug, Error)]
pub enum GhatError {
    /// The invocation cannot be satisfied as given; the user has to change it.
    #[error("{0}")]
    Input(String),

    /// The source string does not match the accepted grammar.
    #[error("could not parse source '{0}'")]
    BadSource(String),

    /// The source string names a host outside the supported set.
    #[error("unsupported host '{host}': ghat supports GitHub, GitLab, Sourcehut and BitBucket")]
    UnsupportedHost {
        /// The normalized host name that was rejected
        host: String,
    },

    /// A local or remote workflow file is not valid YAML.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// The provenance comment of a generated file carries unreadable options.
    #[error("failed to read ghat options in '{path}': {source}")]
    Provenance {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A workflow document cannot be worked on (e.g. its root is not a mapping).
    #[error("invalid workflow '{path}': {message}")]
    InvalidDocument { path: PathBuf, message: String },

    /// Reading or writing a file failed for a reason other than absence.
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The remote tree could not be retrieved.
    #[error(transparent)]
    Transport(#[from] FetchError),
}

impl GhatError {
    /// Build an [`GhatError::Input`] from any displayable message.
    pub fn input(message: impl Into<String>) -> Self {
        GhatError::Input(message.into())
    }

    /// Build an [`GhatError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GhatError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error is something the user can fix by changing the
    /// invocation, as opposed to an environment or programming fault.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            GhatError::Input(_) | GhatError::BadSource(_) | GhatError::UnsupportedHost { .. }
        )
    }
}

impl From<SourceError> for GhatError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::BadSource(source) => GhatError::BadSource(source),
            SourceError::UnsupportedHost(host) => GhatError::UnsupportedHost { host },
        }
    }
}
