//! cli
//!
//! Command-line interface layer for ghat.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Layer configuration under the flags
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, turns them into an
//! immutable [`SyncRequest`](crate::engine::SyncRequest) and hands that to
//! the [`crate::engine`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use crate::core::config::Config;
use crate::engine;
use anyhow::{Context as _, Result};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if let Some(shell) = cli.completions {
        return commands::completion(shell);
    }

    let request = cli.request()?;

    let root = cli.cwd.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = Config::load(&root).context("failed to load configuration")?;

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        workflows_dir: config.workflows_dir(),
        default_host: config.default_host(),
    };

    commands::sync(&ctx, &request)
}
