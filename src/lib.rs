//! ghat - Reuse GitHub Actions workflows across repositories
//!
//! ghat copies the workflow files of a template (or any) repository into the
//! local `.github/workflows` directory, keeps local `env` customizations, and
//! records in each generated file where it came from, so running it again
//! without arguments brings every generated workflow up to date.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates Fetch → Discover → Merge and resync
//! - [`core`] - Domain types, YAML mutation, provenance and configuration
//! - [`fetch`] - Abstraction for retrieving remote trees (git v1)
//! - [`ui`] - Output utilities
//!
//! # Correctness Invariants
//!
//! 1. Local `env` values always win over remote ones
//! 2. A workflow that needs no transformation keeps the remote text unchanged
//! 3. Every generated file records enough to regenerate it
//! 4. One file failing never prevents its siblings from being written

pub mod cli;
pub mod core;
pub mod engine;
pub mod fetch;
pub mod ui;
