//! core::dotpath
//!
//! Dot-notation paths into workflow documents and the two mutations applied
//! through them: deleting a leaf and assigning a value.
//!
//! Each segment is a plain mapping key. Literal dots inside keys cannot be
//! addressed.
//!
//! # Example
//!
//! ```
//! use ghat::core::dotpath::{delete_path, set_path, DotPath};
//! use serde_yaml::{Mapping, Value};
//!
//! let mut tree = Mapping::new();
//! let path = DotPath::new("jobs.build.timeout-minutes").unwrap();
//! set_path(&mut tree, &path, Value::from(30));
//! assert_eq!(
//!     serde_yaml::to_string(&tree).unwrap(),
//!     "jobs:\n  build:\n    timeout-minutes: 30\n"
//! );
//!
//! assert!(delete_path(&mut tree, &DotPath::new("jobs.build").unwrap()));
//! assert!(!delete_path(&mut tree, &DotPath::new("jobs.missing.leaf").unwrap()));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::core::errors::GhatError;
use crate::core::options::Assignment;

/// A validated dot-separated path.
///
/// Paths must be non-empty and must not contain empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DotPath(String);

impl DotPath {
    pub fn new(path: &str) -> Result<Self, GhatError> {
        if path.is_empty() {
            return Err(GhatError::input("YAML paths can't be empty"));
        }
        if path.split('.').any(str::is_empty) {
            return Err(GhatError::input(format!(
                "invalid YAML path '{}': empty segment",
                path
            )));
        }
        Ok(Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The keys this path walks through, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The top-level key this path starts at.
    pub fn root(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }

    /// Split into the parent segments and the leaf key.
    fn split_leaf(&self) -> (Vec<&str>, &str) {
        let mut segments: Vec<&str> = self.segments().collect();
        // Validation guarantees at least one segment.
        let leaf = segments.pop().unwrap_or_default();
        (segments, leaf)
    }
}

impl fmt::Display for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DotPath {
    type Error = GhatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DotPath::new(&value)
    }
}

impl From<DotPath> for String {
    fn from(path: DotPath) -> Self {
        path.0
    }
}

/// Remove the leaf at `path`.
///
/// Returns whether something was removed. A path whose intermediate segments
/// do not resolve to mappings is a no-op, not an error.
pub fn delete_path(tree: &mut Mapping, path: &DotPath) -> bool {
    let (parents, leaf) = path.split_leaf();
    let mut current = tree;
    for segment in parents {
        current = match current.get_mut(segment) {
            Some(Value::Mapping(child)) => child,
            _ => return false,
        };
    }
    current.shift_remove(leaf).is_some()
}

/// Assign `value` at `path`.
///
/// Missing intermediate mappings are created; an intermediate node that is
/// not a mapping is replaced by one.
pub fn set_path(tree: &mut Mapping, path: &DotPath, value: Value) {
    let (parents, leaf) = path.split_leaf();
    let mut current = tree;
    for segment in parents {
        let key = Value::String(segment.to_string());
        let slot = current
            .entry(key)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !slot.is_mapping() {
            *slot = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(child) = slot else {
            return;
        };
        current = child;
    }
    current.insert(Value::String(leaf.to_string()), value);
}

/// Parse the raw value of `assignment` as YAML and assign it.
///
/// `on=push` assigns a string, `matrix.node=[8,10]` a sequence, and an empty
/// value assigns null.
pub fn apply_assignment(tree: &mut Mapping, assignment: &Assignment) -> Result<(), serde_yaml::Error> {
    let value: Value = serde_yaml::from_str(assignment.raw_value())?;
    set_path(tree, assignment.path(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Mapping {
        serde_yaml::from_str(text).unwrap()
    }

    fn path(p: &str) -> DotPath {
        DotPath::new(p).unwrap()
    }

    #[test]
    fn root_is_first_segment() {
        assert_eq!(path("env.TOKEN").root(), "env");
        assert_eq!(path("env").root(), "env");
        assert_eq!(path("jobs.env").root(), "jobs");
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(DotPath::new("").is_err());
        assert!(DotPath::new("jobs..build").is_err());
        assert!(DotPath::new(".jobs").is_err());
        assert!(DotPath::new("jobs.").is_err());
        assert!(DotPath::new("jobs.build").is_ok());
    }

    mod delete {
        use super::*;

        #[test]
        fn removes_exactly_the_named_path() {
            let mut tree = yaml("jobs:\n  Build: {}\n  Test: {}\n");
            assert!(delete_path(&mut tree, &path("jobs.Test")));
            assert_eq!(tree, yaml("jobs:\n  Build: {}\n"));
        }

        #[test]
        fn missing_intermediate_is_noop() {
            let mut tree = yaml("jobs:\n  Build: {}\n");
            assert!(!delete_path(&mut tree, &path("jobs.Lint.steps")));
            assert!(!delete_path(&mut tree, &path("on.push")));
            assert_eq!(tree, yaml("jobs:\n  Build: {}\n"));
        }

        #[test]
        fn scalar_intermediate_is_noop() {
            let mut tree = yaml("on: push\n");
            assert!(!delete_path(&mut tree, &path("on.push")));
            assert_eq!(tree, yaml("on: push\n"));
        }

        #[test]
        fn keeps_sibling_order() {
            let mut tree = yaml("a: 1\nb: 2\nc: 3\nd: 4\n");
            delete_path(&mut tree, &path("b"));
            assert_eq!(serde_yaml::to_string(&tree).unwrap(), "a: 1\nc: 3\nd: 4\n");
        }
    }

    mod set {
        use super::*;

        #[test]
        fn creates_intermediate_nodes() {
            let mut tree = Mapping::new();
            let assignment = Assignment::new("jobs.build.timeout-minutes=30").unwrap();
            apply_assignment(&mut tree, &assignment).unwrap();
            assert_eq!(tree, yaml("jobs:\n  build:\n    timeout-minutes: 30\n"));
        }

        #[test]
        fn parses_strings_and_sequences() {
            let mut tree = yaml("on: pull_request\n");
            apply_assignment(&mut tree, &Assignment::new("on=push").unwrap()).unwrap();
            apply_assignment(
                &mut tree,
                &Assignment::new("jobs.build.strategy.matrix.node-version=[8.x,10.x]").unwrap(),
            )
            .unwrap();
            assert_eq!(
                tree,
                yaml(
                    "on: push\njobs:\n  build:\n    strategy:\n      matrix:\n        node-version: [8.x, 10.x]\n"
                )
            );
        }

        #[test]
        fn overwrites_non_mapping_intermediate() {
            let mut tree = yaml("jobs: none\n");
            set_path(&mut tree, &path("jobs.build.runs-on"), Value::from("ubuntu-latest"));
            assert_eq!(tree, yaml("jobs:\n  build:\n    runs-on: ubuntu-latest\n"));
        }

        #[test]
        fn overwrites_existing_leaf_in_place() {
            let mut tree = yaml("name: CI\nruns-on: linux\n");
            set_path(&mut tree, &path("name"), Value::from("Lint"));
            assert_eq!(
                serde_yaml::to_string(&tree).unwrap(),
                "name: Lint\nruns-on: linux\n"
            );
        }

        #[test]
        fn value_with_colon_is_a_string() {
            let mut tree = Mapping::new();
            apply_assignment(
                &mut tree,
                &Assignment::new("jobs.Test.container=node:12.15").unwrap(),
            )
            .unwrap();
            assert_eq!(tree, yaml("jobs:\n  Test:\n    container: 'node:12.15'\n"));
        }

        #[test]
        fn empty_value_assigns_null() {
            let mut tree = Mapping::new();
            apply_assignment(&mut tree, &Assignment::new("jobs.build.if=").unwrap()).unwrap();
            assert_eq!(tree, yaml("jobs:\n  build:\n    if: null\n"));
        }
    }
}
