//! cli::commands::sync
//!
//! Copy workflows from a source, or update the ones already generated.
//!
//! # Example
//!
//! ```bash
//! # Copy the workflows of a template repository
//! ghat fregante/ghatemplates/node
//!
//! # Update every workflow generated by ghat
//! ghat
//! ```

use anyhow::Result;

use crate::cli::args::parse_replay;
use crate::engine::{Context, Engine, SyncRequest};
use crate::fetch::{Fetcher, GitFetcher};
use crate::ui::output;

/// Run the sync command against the network.
///
/// This is a synchronous wrapper that uses a current-thread tokio runtime.
pub fn sync(ctx: &Context, request: &SyncRequest) -> Result<()> {
    let fetcher = GitFetcher::new();
    sync_with(ctx, &fetcher, request)
}

/// Run the sync command with the given fetcher.
pub fn sync_with(ctx: &Context, fetcher: &dyn Fetcher, request: &SyncRequest) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(sync_async(ctx, fetcher, request))
}

async fn sync_async(ctx: &Context, fetcher: &dyn Fetcher, request: &SyncRequest) -> Result<()> {
    let verbosity = ctx.verbosity();
    let engine = Engine::new(ctx.clone(), fetcher).with_replay(parse_replay);
    let report = engine.run(request).await?;

    for path in report.written() {
        output::success(format!("Updated {}", path.display()), verbosity);
    }
    report.into_result(verbosity)?;
    Ok(())
}
