//! engine::merge
//!
//! Merging one remote workflow into its local counterpart.
//!
//! # Algorithm
//!
//! 1. Verbatim: copy the remote text unchanged. Nothing else happens.
//! 2. Merge `env`: remote keys first, local keys override. A top-level `env`
//!    of any shape is removed from the remote body and marks it dirty.
//! 3. Delete every `exclude` path (dirty if any reaches the body).
//! 4. Apply every `set` assignment in order (dirty if any reaches the body).
//!    Paths rooted at `env` act on the merged `env` block instead.
//! 5. A dirty body is re-serialized; a clean one keeps the remote text
//!    byte-for-byte, minus a leading `---` or trailing `...` marker.
//! 6. Output: the `env` block, a blank line, the provenance comment block, a
//!    blank line, then the body.
//!
//! Steps 2 to 6 are [`render`], a pure function of the two documents. Its
//! output is always a single YAML document with one `env` key.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::core::document::{load_text, Loaded, YamlDocument};
use crate::core::dotpath::{apply_assignment, delete_path, DotPath};
use crate::core::errors::GhatError;
use crate::core::options::MergeOptions;
use crate::core::provenance;

/// Everything a merge needs besides the two documents.
#[derive(Debug, Clone, Copy)]
pub struct MergeJob<'a> {
    /// Source string as given by the user, recorded in provenance
    pub source: &'a str,
    /// Canonical repository URL, recorded in provenance
    pub url: &'a str,
    pub options: &'a MergeOptions,
}

impl<'a> MergeJob<'a> {
    pub fn new(source: &'a str, url: &'a str, options: &'a MergeOptions) -> Self {
        Self {
            source,
            url,
            options,
        }
    }
}

/// Produce the text of the generated file.
///
/// Not used for verbatim jobs, which never parse the remote.
///
/// # Errors
///
/// [`GhatError::Parse`] if a `set` value fails to parse or the result cannot
/// be serialized.
pub fn render(local: &YamlDocument, remote: YamlDocument, job: &MergeJob<'_>) -> Result<String, GhatError> {
    let YamlDocument {
        path: remote_path,
        raw_text,
        mut tree,
    } = remote;
    let yaml_error = |source: serde_yaml::Error| GhatError::Parse {
        path: remote_path.clone(),
        source,
    };

    let mut dirty = false;
    let mut env = Mapping::new();
    if let Some(remote_env) = tree.shift_remove(ENV) {
        if let Value::Mapping(remote_env) = remote_env {
            env = remote_env;
        }
        dirty = true;
    }
    if let Some(local_env) = local.env() {
        for (key, value) in local_env {
            env.insert(key.clone(), value.clone());
        }
    }

    let mut head = Mapping::new();
    head.insert(Value::from(ENV), Value::Mapping(env));

    let options = job.options;
    for path in options.exclude() {
        dirty |= !is_env_path(path);
        delete_path(target(&mut head, &mut tree, path), path);
    }
    for assignment in options.set() {
        let path = assignment.path();
        dirty |= !is_env_path(path);
        apply_assignment(target(&mut head, &mut tree, path), assignment).map_err(yaml_error)?;
    }
    if !head.contains_key(ENV) {
        head.insert(Value::from(ENV), Value::Mapping(Mapping::new()));
    }

    let body = match single_document_body(&raw_text) {
        Some(text) if !dirty => text,
        _ if tree.is_empty() => String::new(),
        _ => serde_yaml::to_string(&tree).map_err(yaml_error)?,
    };
    let head = serde_yaml::to_string(&head).map_err(yaml_error)?;

    let comments = provenance::encode(job.source, job.url, options);
    Ok(format!("{}\n{}\n\n{}", head, comments.join("\n"), body))
}

const ENV: &str = "env";

fn is_env_path(path: &DotPath) -> bool {
    path.root() == ENV
}

/// The mapping a path applies to: the merged `env` block or the body.
fn target<'t>(head: &'t mut Mapping, body: &'t mut Mapping, path: &DotPath) -> &'t mut Mapping {
    if is_env_path(path) {
        head
    } else {
        body
    }
}

/// The remote text with its document markers dropped.
///
/// `None` when the text holds a marker that cannot be dropped without
/// changing the document, such as a directive or a second document.
fn single_document_body(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.split_inclusive('\n').collect();
    let is_content = |line: &&str| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#')
    };
    let first = lines.iter().position(is_content);
    let last = lines.iter().rposition(is_content);

    let mut kept = String::with_capacity(raw.len());
    for (index, line) in lines.iter().enumerate() {
        match document_marker(line) {
            Some(("---", true)) if Some(index) == first => {}
            Some(("...", true)) if Some(index) == last => {}
            Some(_) => return None,
            None => kept.push_str(line),
        }
    }
    Some(kept)
}

/// Recognize a `---` or `...` line; the flag is set when nothing but a
/// comment follows the marker.
fn document_marker(line: &str) -> Option<(&'static str, bool)> {
    let line = line.trim_end();
    ["---", "..."].into_iter().find_map(|marker| {
        let rest = line.strip_prefix(marker)?;
        if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
            return None;
        }
        let rest = rest.trim_start();
        Some((marker, rest.is_empty() || rest.starts_with('#')))
    })
}

/// Merge `remote_path` into `local_path` and write the result.
///
/// Returns the path written.
pub async fn apply(job: &MergeJob<'_>, remote_path: &Path, local_path: &Path) -> Result<PathBuf, GhatError> {
    let text = if job.options.is_verbatim() {
        match load_text(remote_path).await? {
            Loaded::Found(text) => text,
            Loaded::Absent => String::new(),
        }
    } else {
        let (local, remote) = tokio::try_join!(
            YamlDocument::load(local_path),
            YamlDocument::load(remote_path)
        )?;
        render(&local, remote, job)?
    };

    tokio::fs::write(local_path, text)
        .await
        .map_err(|e| GhatError::io(local_path, e))?;
    Ok(local_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://github.com/owner/repo";

    fn doc(text: &str) -> YamlDocument {
        YamlDocument::parse("remote.yml", text.to_string()).unwrap()
    }

    fn options(exclude: &[&str], set: &[&str]) -> MergeOptions {
        MergeOptions::new(exclude, set, false).unwrap()
    }

    fn render_with(local: &str, remote: &str, opts: &MergeOptions) -> String {
        let job = MergeJob::new("owner/repo", URL, opts);
        render(&doc(local), doc(remote), &job).unwrap()
    }

    #[test]
    fn env_moves_to_top_block() {
        let out = render_with(
            "",
            "name: CI\nenv:\n  X: 1\njobs:\n  build: {}\n",
            &MergeOptions::default(),
        );
        assert_eq!(
            out,
            "env:\n  X: 1\n\n# FILE GENERATED WITH: owner/repo\n# SOURCE: https://github.com/owner/repo\n\nname: CI\njobs:\n  build: {}\n"
        );
    }

    #[test]
    fn local_env_wins() {
        let out = render_with(
            "env:\n  B: 9\n  C: 3\n",
            "env:\n  A: 1\n  B: 2\non: push\n",
            &MergeOptions::default(),
        );
        assert!(out.starts_with("env:\n  A: 1\n  B: 9\n  C: 3\n\n"));
    }

    #[test]
    fn clean_body_is_kept_byte_for_byte() {
        let remote = "# keep me\non:   push # odd spacing\njobs: {}\n";
        let out = render_with("", remote, &MergeOptions::default());
        assert!(out.starts_with("env: {}\n\n# FILE GENERATED WITH: owner/repo\n"));
        assert!(out.ends_with(&format!("\n\n{}", remote)));
    }

    #[test]
    fn generated_text_parses_again() {
        let remotes = [
            "env: {}\non: push\n",
            "env:\nname: CI\n",
            "env: [A, B]\nname: CI\n",
            "---\nname: CI\non: push\n",
            "# header\n---\nname: CI\n...\n",
            "%YAML 1.1\n---\nname: CI\n",
            "env:\n  X: 1\n",
        ];
        let variants = [
            MergeOptions::default(),
            options(&["jobs.a"], &[]),
            options(&[], &["env.FOO=bar"]),
            options(&["env"], &[]),
        ];
        for remote in remotes {
            for opts in &variants {
                let first = render_with("env:\n  LOCAL: 1\n", remote, opts);
                let parsed = YamlDocument::parse("ci.yml", first.clone())
                    .unwrap_or_else(|e| panic!("{:?} from {:?}: {}", first, remote, e));
                assert!(parsed.env().is_some(), "{:?}", first);
                assert_eq!(render_with(&first, remote, opts), first);
            }
        }
    }

    #[test]
    fn non_mapping_remote_env_is_dropped_from_body() {
        let out = render_with("", "env: {}\non: push\n", &MergeOptions::default());
        assert_eq!(out.matches("env:").count(), 1);
        assert!(out.starts_with("env: {}\n\n"));
    }

    #[test]
    fn document_markers_are_dropped_from_clean_body() {
        let out = render_with("", "# keep\n---\nname:   CI\n...\n", &MergeOptions::default());
        assert!(out.ends_with("\n\n# keep\nname:   CI\n"));
    }

    #[test]
    fn set_on_env_goes_to_top_block() {
        let opts = options(&[], &["env.FOO=bar"]);
        let out = render_with("", "name:  CI\n", &opts);
        assert_eq!(
            out,
            "env:\n  FOO: bar\n\n# FILE GENERATED WITH: owner/repo\n# SOURCE: https://github.com/owner/repo\n# OPTIONS: {\"set\":[\"env.FOO=bar\"]}\n\nname:  CI\n"
        );
    }

    #[test]
    fn exclude_on_env_removes_merged_key() {
        let opts = options(&["env.TOKEN"], &[]);
        let out = render_with("env:\n  TOKEN: local\n  KEEP: 1\n", "env:\n  TOKEN: remote\nname: CI\n", &opts);
        assert!(out.starts_with("env:\n  KEEP: 1\n\n"));
    }

    #[test]
    fn exclude_and_set_rewrite_body_and_record_options() {
        let opts = options(&["jobs.Test"], &["name=Lint"]);
        let out = render_with("", "name: CI\njobs:\n  Build: {}\n  Test: {}\n", &opts);
        assert_eq!(
            out,
            "env: {}\n\n# FILE GENERATED WITH: owner/repo\n# SOURCE: https://github.com/owner/repo\n# OPTIONS: {\"exclude\":[\"jobs.Test\"],\"set\":[\"name=Lint\"]}\n\nname: Lint\njobs:\n  Build: {}\n"
        );
    }

    #[test]
    fn output_is_stable_when_rerun() {
        let remote = "env:\n  X: 1\non: push\n";
        let opts = options(&[], &["jobs.a.timeout-minutes=5"]);
        let first = render_with("", remote, &opts);
        let second = render_with(&first, remote, &opts);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn apply_writes_merged_file() {
        let temp = TempDir::new().unwrap();
        let remote = temp.path().join("remote.yml");
        let local = temp.path().join("local.yml");
        std::fs::write(&remote, "env:\n  X: 1\nname: CI\n").unwrap();
        std::fs::write(&local, "env:\n  X: 2\nold: true\n").unwrap();

        let opts = MergeOptions::default();
        let written = apply(&MergeJob::new("owner/repo", URL, &opts), &remote, &local)
            .await
            .unwrap();

        assert_eq!(written, local);
        let text = std::fs::read_to_string(&local).unwrap();
        assert!(text.starts_with("env:\n  X: 2\n\n"));
        assert!(text.ends_with("\nname: CI\n"));
        assert!(!text.contains("old: true"));
    }

    #[tokio::test]
    async fn apply_verbatim_copies_remote() {
        let temp = TempDir::new().unwrap();
        let remote = temp.path().join("remote.yml");
        let local = temp.path().join("local.yml");
        let text = "env:\n  X: 1\n# anything goes: [\n";
        std::fs::write(&remote, text).unwrap();

        let opts = MergeOptions::verbatim();
        apply(&MergeJob::new("owner/repo", URL, &opts), &remote, &local)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&local).unwrap(), text);
    }

    #[tokio::test]
    async fn apply_reports_malformed_local() {
        let temp = TempDir::new().unwrap();
        let remote = temp.path().join("remote.yml");
        let local = temp.path().join("local.yml");
        std::fs::write(&remote, "on: push\n").unwrap();
        std::fs::write(&local, "env: [unclosed\n").unwrap();

        let opts = MergeOptions::default();
        let err = apply(&MergeJob::new("owner/repo", URL, &opts), &remote, &local)
            .await
            .unwrap_err();
        assert!(matches!(err, GhatError::Parse { ref path, .. } if path == &local));
        assert_eq!(std::fs::read_to_string(&local).unwrap(), "env: [unclosed\n");
    }
}
