//! core::options
//!
//! Merge options, built once at the boundary and never mutated afterwards.
//!
//! # Invariants
//!
//! - `verbatim` excludes non-empty `exclude`/`set`.
//! - Every `exclude` entry and every `set` path is a non-empty dot path.
//! - `set` entries keep their raw `path=value` spelling so they can be
//!   written back into provenance comments unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::dotpath::DotPath;
use crate::core::errors::GhatError;

/// A `path=value` assignment from `--set`.
///
/// The entry is split on the first `=` only, so values may contain `=`.
///
/// ```
/// use ghat::core::options::Assignment;
///
/// let assignment = Assignment::new("env.FLAGS=--a=b").unwrap();
/// assert_eq!(assignment.path().as_str(), "env.FLAGS");
/// assert_eq!(assignment.raw_value(), "--a=b");
/// assert!(Assignment::new("no-equals-sign").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Assignment {
    path: DotPath,
    value: String,
}

impl Assignment {
    /// Parse a `path=value` entry.
    pub fn new(entry: &str) -> Result<Self, GhatError> {
        let (path, value) = entry.split_once('=').ok_or_else(|| {
            GhatError::input(format!(
                "`--set {}` must have the form path=value",
                entry
            ))
        })?;
        let path = DotPath::new(path)?;
        serde_yaml::from_str::<serde_yaml::Value>(value).map_err(|e| {
            GhatError::input(format!("invalid YAML value in `--set {}`: {}", entry, e))
        })?;
        Ok(Self {
            path,
            value: value.to_string(),
        })
    }

    /// The dot path being assigned.
    pub fn path(&self) -> &DotPath {
        &self.path
    }

    /// The unparsed YAML value.
    pub fn raw_value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.path, self.value)
    }
}

impl TryFrom<String> for Assignment {
    type Error = GhatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Assignment::new(&value)
    }
}

impl From<Assignment> for String {
    fn from(assignment: Assignment) -> Self {
        assignment.to_string()
    }
}

/// Options controlling how remote workflows are merged into local ones.
///
/// Serializes to the `OPTIONS` JSON of provenance comments; empty lists are
/// omitted and `verbatim` is never recorded (verbatim files carry no
/// provenance).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Dot paths removed from each remote workflow
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    exclude: Vec<DotPath>,

    /// Assignments applied to each remote workflow, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    set: Vec<Assignment>,

    /// Copy remote files byte-for-byte
    #[serde(skip)]
    verbatim: bool,
}

impl MergeOptions {
    /// Build options from raw flag values.
    ///
    /// # Errors
    ///
    /// Returns [`GhatError::Input`] when `verbatim` is combined with
    /// `exclude`/`set`, or when an entry is malformed.
    pub fn new<E, S>(exclude: E, set: S, verbatim: bool) -> Result<Self, GhatError>
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let exclude = exclude
            .into_iter()
            .map(|path| DotPath::new(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let set = set
            .into_iter()
            .map(|entry| Assignment::new(entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if verbatim && (!exclude.is_empty() || !set.is_empty()) {
            return Err(GhatError::input(
                "`verbatim` can't be used together with `set`/`exclude`",
            ));
        }

        Ok(Self {
            exclude,
            set,
            verbatim,
        })
    }

    /// Options for a byte-for-byte copy.
    pub fn verbatim() -> Self {
        Self {
            verbatim: true,
            ..Self::default()
        }
    }

    pub fn exclude(&self) -> &[DotPath] {
        &self.exclude
    }

    pub fn set(&self) -> &[Assignment] {
        &self.set
    }

    pub fn is_verbatim(&self) -> bool {
        self.verbatim
    }

    /// True when neither `exclude` nor `set` has entries.
    ///
    /// Such options are not written into provenance comments.
    pub fn has_transforms(&self) -> bool {
        !self.exclude.is_empty() || !self.set.is_empty()
    }

    /// True when no option at all was given.
    pub fn is_empty(&self) -> bool {
        !self.verbatim && !self.has_transforms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbatim_conflicts_with_transforms() {
        let err = MergeOptions::new(["jobs.Test"], Vec::<String>::new(), true).unwrap_err();
        assert!(err.is_user_error());

        let err = MergeOptions::new(Vec::<String>::new(), ["on=push"], true).unwrap_err();
        assert!(err.is_user_error());

        let options = MergeOptions::new(Vec::<String>::new(), Vec::<String>::new(), true).unwrap();
        assert!(options.is_verbatim());
        assert!(!options.has_transforms());
    }

    #[test]
    fn set_splits_on_first_equals() {
        let options =
            MergeOptions::new(Vec::<String>::new(), ["jobs.Test.container=node:12.15=x"], false)
                .unwrap();
        let assignment = &options.set()[0];
        assert_eq!(assignment.path().as_str(), "jobs.Test.container");
        assert_eq!(assignment.raw_value(), "node:12.15=x");
    }

    #[test]
    fn set_without_equals_is_input_error() {
        let err = MergeOptions::new(Vec::<String>::new(), ["on"], false).unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn malformed_value_is_input_error() {
        let err = MergeOptions::new(Vec::<String>::new(), ["a=[1, 2"], false).unwrap_err();
        assert!(err.is_user_error());
    }

    #[test]
    fn empty_paths_rejected() {
        assert!(MergeOptions::new([""], Vec::<String>::new(), false).is_err());
        assert!(MergeOptions::new(Vec::<String>::new(), ["=push"], false).is_err());
    }

    #[test]
    fn json_omits_empty_lists() {
        let options = MergeOptions::new(["jobs.Test"], Vec::<String>::new(), false).unwrap();
        assert_eq!(
            serde_json::to_string(&options).unwrap(),
            r#"{"exclude":["jobs.Test"]}"#
        );

        let options = MergeOptions::new(["a"], ["b.c=[8,10]"], false).unwrap();
        assert_eq!(
            serde_json::to_string(&options).unwrap(),
            r#"{"exclude":["a"],"set":["b.c=[8,10]"]}"#
        );
    }

    #[test]
    fn json_reads_missing_lists_as_empty() {
        let options: MergeOptions = serde_json::from_str(r#"{"set":["on=push"]}"#).unwrap();
        assert!(options.exclude().is_empty());
        assert_eq!(options.set()[0].to_string(), "on=push");
        assert!(!options.is_verbatim());
    }

    #[test]
    fn json_rejects_malformed_assignment() {
        assert!(serde_json::from_str::<MergeOptions>(r#"{"set":["nope"]}"#).is_err());
    }
}
