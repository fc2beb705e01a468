//! cli::commands
//!
//! Command handlers.
//!
//! # Architecture
//!
//! Each handler:
//! 1. Receives validated input from the CLI layer
//! 2. Calls the engine to execute the run
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Syncing fetches over the network, so it is async. The handler builds a
//! current-thread tokio runtime and blocks on it.

mod completion;
mod sync;

pub use completion::completion;
pub use sync::{sync, sync_with};
