//! core::provenance
//!
//! Provenance comments embedded in generated workflow files.
//!
//! # Format
//!
//! ```text
//! # FILE GENERATED WITH: <source>
//! # SOURCE: <canonical url>
//! # OPTIONS: {"exclude":[...],"set":[...]}
//! ```
//!
//! The `OPTIONS` line is only written when `exclude` or `set` has entries.
//!
//! # Decoding
//!
//! [`decode`] recognizes, in this order:
//!
//! 1. The current block above. The generated-with line may carry a leading
//!    `npx ghat ` or `ghat ` command prefix; the marker is case-insensitive.
//! 2. The legacy single line `# do not edit below ... use ... npx ghat <args>`,
//!    which only preserves the original command line.
//!
//! Files without either marker decode to [`Provenance::Absent`].

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::errors::GhatError;
use crate::core::options::MergeOptions;

/// What a generated file says about how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Current format: source string and the options that were applied.
    Current {
        source: String,
        options: MergeOptions,
    },
    /// Legacy format: only the original command-line arguments are known.
    Legacy { args: String },
    /// No provenance marker.
    Absent,
}

/// The comment block written above the workflow body.
///
/// ```
/// use ghat::core::options::MergeOptions;
/// use ghat::core::provenance::ProvenanceBlock;
///
/// let options = MergeOptions::default();
/// let block = ProvenanceBlock::new("owner/repo", "https://github.com/owner/repo", &options);
/// assert_eq!(
///     block.to_string(),
///     "# FILE GENERATED WITH: owner/repo\n# SOURCE: https://github.com/owner/repo"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ProvenanceBlock<'a> {
    source: &'a str,
    url: &'a str,
    options: &'a MergeOptions,
}

impl<'a> ProvenanceBlock<'a> {
    pub fn new(source: &'a str, url: &'a str, options: &'a MergeOptions) -> Self {
        Self {
            source,
            url,
            options,
        }
    }

    /// The comment lines, each starting with `# `.
    pub fn lines(&self) -> Vec<String> {
        self.to_string().lines().map(str::to_string).collect()
    }
}

impl fmt::Display for ProvenanceBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "# FILE GENERATED WITH: {}", self.source)?;
        write!(f, "\n# SOURCE: {}", self.url)?;
        if self.options.has_transforms() {
            let json = serde_json::to_string(self.options).map_err(|_| fmt::Error)?;
            write!(f, "\n# OPTIONS: {}", json)?;
        }
        Ok(())
    }
}

/// Encode the provenance comment lines for `source` and `options`.
pub fn encode(source: &str, url: &str, options: &MergeOptions) -> Vec<String> {
    ProvenanceBlock::new(source, url, options).lines()
}

/// Recover provenance from the text of a generated file.
///
/// `path` is only used to name the file in errors.
///
/// # Errors
///
/// [`GhatError::Provenance`] when an `OPTIONS` line is present but its JSON
/// cannot be read. Missing markers are not an error.
pub fn decode(path: &Path, text: &str) -> Result<Provenance, GhatError> {
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let Some(captures) = generated_with_pattern().captures(line) else {
            continue;
        };
        let source = captures["source"].to_string();

        let mut options = MergeOptions::default();
        for comment in lines.by_ref().take_while(|l| l.trim_start().starts_with('#')) {
            if let Some(found) = options_pattern().captures(comment) {
                options = serde_json::from_str(&found["options"]).map_err(|source| {
                    GhatError::Provenance {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                break;
            }
        }
        return Ok(Provenance::Current { source, options });
    }

    if let Some(captures) = legacy_pattern().captures(text) {
        return Ok(Provenance::Legacy {
            args: captures["args"].trim().to_string(),
        });
    }

    Ok(Provenance::Absent)
}

fn generated_with_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*#\s*file generated with:\s*(?:npx\s+ghat\s+|ghat\s+)?(?P<source>\S.*?)\s*$")
            .expect("generated-with pattern is a valid regex")
    })
}

fn options_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*#\s*options:\s*(?P<options>.*?)\s*$")
            .expect("options pattern is a valid regex")
    })
}

fn legacy_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)# do not edit below[ ,-]+use[ :`]+npx ghat (?P<args>[^\n`]+)")
            .expect("legacy pattern is a valid regex")
    })
}
