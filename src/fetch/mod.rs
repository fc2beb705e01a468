//! fetch
//!
//! Retrieval of remote template trees.
//!
//! # Architecture
//!
//! The engine only sees the [`Fetcher`] trait. [`GitFetcher`] clones with
//! libgit2 for real runs; [`mock::MockFetcher`] serves fixture directories
//! in tests. Errors are passed through to the caller unchanged.

pub mod git;
pub mod mock;
pub mod traits;

pub use git::GitFetcher;
pub use traits::{FetchError, Fetcher, StagedTree};
