//! core::document
//!
//! Loading workflow files as YAML documents.
//!
//! # Absence
//!
//! A missing file is a valid, empty state. [`load_text`] reports it as
//! [`Loaded::Absent`] and [`YamlDocument::from_loaded`] turns that into an
//! empty document. Every other read failure propagates.
//!
//! # Empty text
//!
//! Files that are empty, or contain only comments, parse to an empty mapping.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::core::errors::GhatError;

/// Outcome of reading a file that may legitimately be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded {
    Found(String),
    Absent,
}

/// Read `path` as UTF-8, reporting a missing file as [`Loaded::Absent`].
pub async fn load_text(path: &Path) -> Result<Loaded, GhatError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Loaded::Found(text)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Loaded::Absent),
        Err(err) => Err(GhatError::io(path, err)),
    }
}

/// A workflow file: its raw text and its parsed top-level mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlDocument {
    /// Where the document was read from
    pub path: PathBuf,
    /// Text exactly as read; empty when the file was absent
    pub raw_text: String,
    /// Parsed top-level mapping
    pub tree: Mapping,
}

impl YamlDocument {
    /// The empty document standing in for a missing file.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            raw_text: String::new(),
            tree: Mapping::new(),
        }
    }

    /// Parse `text` read from `path`.
    ///
    /// # Errors
    ///
    /// [`GhatError::Parse`] for malformed YAML and
    /// [`GhatError::InvalidDocument`] when the root is not a mapping.
    pub fn parse(path: impl Into<PathBuf>, text: String) -> Result<Self, GhatError> {
        let path = path.into();
        let tree = match serde_yaml::from_str::<Value>(&text) {
            Ok(Value::Mapping(mapping)) => mapping,
            Ok(Value::Null) => Mapping::new(),
            Ok(other) => {
                return Err(GhatError::InvalidDocument {
                    path,
                    message: format!("expected a mapping at the top level, found {}", kind(&other)),
                })
            }
            Err(source) => return Err(GhatError::Parse { path, source }),
        };
        Ok(Self {
            path,
            raw_text: text,
            tree,
        })
    }

    /// Build a document from a load result; absence yields [`YamlDocument::empty`].
    pub fn from_loaded(path: impl Into<PathBuf>, loaded: Loaded) -> Result<Self, GhatError> {
        match loaded {
            Loaded::Found(text) => Self::parse(path, text),
            Loaded::Absent => Ok(Self::empty(path)),
        }
    }

    /// Read and parse `path`.
    pub async fn load(path: &Path) -> Result<Self, GhatError> {
        let loaded = load_text(path).await?;
        Self::from_loaded(path, loaded)
    }

    /// The top-level `env` mapping, if the document declares one.
    ///
    /// A non-mapping `env` is treated as absent.
    pub fn env(&self) -> Option<&Mapping> {
        self.tree.get("env").and_then(Value::as_mapping)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
