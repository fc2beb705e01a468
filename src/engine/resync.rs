//! engine::resync
//!
//! Recovering what previously generated workflows were made from.
//!
//! [`recover`] reads every workflow in the local workflows directory and
//! keeps those whose provenance decodes to something. [`plan`] turns the
//! recovered records into the distinct replays to run: a source that produced
//! several local files with the same options is replayed once.

use std::path::PathBuf;

use futures::future::join_all;

use crate::core::document::{load_text, Loaded};
use crate::core::errors::GhatError;
use crate::core::options::MergeOptions;
use crate::core::provenance::{self, Provenance};
use crate::engine::discovery::find_yaml_files;
use crate::engine::Context;

/// A local workflow and the provenance found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    /// Path of the workflow, relative to the run root
    pub path: PathBuf,
    pub provenance: Provenance,
}

/// How a recovered record is brought up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replay {
    /// Current format: sync the recorded source with the recorded options.
    Sync {
        source: String,
        options: MergeOptions,
    },
    /// Legacy format: re-run the recorded command line.
    Command { args: String },
}

/// A distinct replay and the local files it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResyncTask {
    pub replay: Replay,
    pub origins: Vec<PathBuf>,
}

/// Decode the provenance of every local workflow.
///
/// Files without provenance are skipped; a file whose `OPTIONS` cannot be
/// read fails the scan.
pub async fn recover(ctx: &Context) -> Result<Vec<Recovered>, GhatError> {
    let root = ctx.root();
    let files = find_yaml_files(&root, &ctx.workflows_dir).await?;

    let decoded = join_all(files.into_iter().map(|path| {
        let absolute = root.join(&path);
        async move {
            let provenance = match load_text(&absolute).await? {
                Loaded::Found(text) => provenance::decode(&path, &text)?,
                Loaded::Absent => Provenance::Absent,
            };
            Ok::<_, GhatError>(Recovered { path, provenance })
        }
    }))
    .await;

    let mut recovered = Vec::new();
    for entry in decoded {
        let entry = entry?;
        if entry.provenance != Provenance::Absent {
            recovered.push(entry);
        }
    }
    Ok(recovered)
}

/// Group recovered records into distinct replays, keeping first-seen order.
pub fn plan(recovered: Vec<Recovered>) -> Vec<ResyncTask> {
    let mut tasks: Vec<ResyncTask> = Vec::new();
    for Recovered { path, provenance } in recovered {
        let replay = match provenance {
            Provenance::Current { source, options } => Replay::Sync { source, options },
            Provenance::Legacy { args } => Replay::Command { args },
            Provenance::Absent => continue,
        };
        match tasks.iter_mut().find(|task| task.replay == replay) {
            Some(task) => task.origins.push(path),
            None => tasks.push(ResyncTask {
                replay,
                origins: vec![path],
            }),
        }
    }
    tasks
}
