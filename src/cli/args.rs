//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Flags
//!
//! - `[SOURCE]`: where to copy workflows from; omitted to update existing ones
//! - `--exclude <PATH>` / `--set <PATH=VALUE>`: repeatable transforms
//! - `--verbatim`: copy files unchanged
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--completions <shell>`: Print a completion script and exit
//!
//! # Legacy replay
//!
//! Files generated by older releases only record the command line that
//! produced them. [`parse_replay`] splits such a line shell-style and runs it
//! through the same parser as the process arguments.

use clap::Parser;
use std::path::PathBuf;

use crate::core::errors::GhatError;
use crate::engine::SyncRequest;

/// ghat - Reuse GitHub Actions workflows across repositories
#[derive(Parser, Debug)]
#[command(name = "ghat")]
#[command(author, version, about)]
#[command(
    long_about = "Reuse GitHub Actions workflows across repositories.\n\n\
        Copies the workflows of SOURCE into .github/workflows, keeping the local \
        `env` values and recording where each file came from. Run without a \
        SOURCE to update every workflow previously generated by ghat.",
    after_help = "\
EXAMPLES:
    # Copy every workflow of a template directory
    ghat fregante/ghatemplates/node

    # Drop jobs you don't need
    ghat fregante/ghatemplates/node --exclude jobs.Build --exclude jobs.Test

    # Override values (interpreted as YAML)
    ghat fregante/ghatemplates/node --set on=push
    ghat fregante/ghatemplates/node --set 'jobs.Test.container=node:12.15'
    ghat fregante/ghatemplates/node-multi --set jobs.build.strategy.matrix.node-version=\\[8.x,10.x\\]

    # Copy a single file
    ghat fregante/ghatemplates/node/build.yml

    # Update all workflows generated by ghat
    ghat"
)]
pub struct Cli {
    /// Repository to copy workflows from: [host/]owner/name[/path][#ref]
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Any part of the YAML file to be removed (can be repeated)
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<String>,

    /// Value to add (can be repeated), interpreted as YAML/JSON
    #[arg(long, value_name = "PATH=VALUE")]
    pub set: Vec<String>,

    /// Download the workflows without making any changes whatsoever
    #[arg(long)]
    pub verbatim: bool,

    /// Run as if ghat was started in this directory
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Validate the parsed flags into a request.
    pub fn request(&self) -> Result<SyncRequest, GhatError> {
        SyncRequest::new(
            self.source.clone(),
            self.exclude.clone(),
            self.set.clone(),
            self.verbatim,
        )
    }
}

/// Parse a recorded command line (without the program name).
///
/// # Errors
///
/// [`GhatError::Input`] when the line cannot be split or does not parse as
/// ghat arguments.
pub fn parse_replay(args: &str) -> Result<SyncRequest, GhatError> {
    let tokens = split_command_line(args)?;
    let cli = Cli::try_parse_from(std::iter::once("ghat".to_string()).chain(tokens)).map_err(
        |e| {
            let reason = e.to_string();
            let reason = reason.lines().next().unwrap_or_default().trim_start_matches("error: ");
            GhatError::input(format!("cannot replay `ghat {}`: {}", args, reason))
        },
    )?;
    cli.request()
}

/// Split a command line into words the way a POSIX shell would.
///
/// Supports single quotes (literal), double quotes (with `\"` and `\\`
/// escapes) and backslash escapes outside quotes.
///
/// ```
/// use ghat::cli::args::split_command_line;
///
/// let words = split_command_line(r#"owner/repo --set 'a=b c' --set x=\[1,2\]"#).unwrap();
/// assert_eq!(words, ["owner/repo", "--set", "a=b c", "--set", "x=[1,2]"]);
/// ```
pub fn split_command_line(line: &str) -> Result<Vec<String>, GhatError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(unterminated(line)),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\' | '$' | '`')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(unterminated(line)),
                        },
                        Some(c) => current.push(c),
                        None => return Err(unterminated(line)),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    current.push(c);
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn unterminated(line: &str) -> GhatError {
    GhatError::input(format!("unterminated quote in `{}`", line))
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
