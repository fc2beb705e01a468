//! engine::runner
//!
//! Engine runner - the single entry point for a ghat run.
//!
//! # Architecture
//!
//! ```text
//! run(request)
//!   source given -> sync_source: parse -> fetch -> discover -> merge (all files)
//!   no source    -> resync: recover -> plan -> sync_source (all replays)
//! ```
//!
//! Legacy provenance records hold a raw command line. It is parsed by the
//! injected [`ReplayParser`] into a [`SyncRequest`] and must name a source, so
//! a replay never turns into another resync.
//!
//! # Invariants
//!
//! - Fetched trees stay staged until every merge from them has settled
//! - Per-file and per-replay failures are collected, never short-circuited
//! - Nothing already written is rolled back

use std::path::PathBuf;

use futures::future::join_all;

use super::discovery;
use super::merge::{self, MergeJob};
use super::report::{FileOutcome, SyncReport};
use super::resync::{self, Replay, ResyncTask};
use super::{Context, SyncRequest};
use crate::core::errors::GhatError;
use crate::core::options::MergeOptions;
use crate::core::source::SourceDescriptor;
use crate::fetch::Fetcher;
use crate::ui::output;

/// Turns a recorded legacy command line into a request.
pub type ReplayParser = fn(&str) -> Result<SyncRequest, GhatError>;

fn no_replay(args: &str) -> Result<SyncRequest, GhatError> {
    Err(GhatError::input(format!(
        "cannot replay legacy ghat command `{}`",
        args
    )))
}

/// Runs sync requests against a fetcher.
pub struct Engine<'a> {
    ctx: Context,
    fetcher: &'a dyn Fetcher,
    replay: ReplayParser,
}

impl<'a> Engine<'a> {
    /// Create an engine that refuses to replay legacy command lines.
    pub fn new(ctx: Context, fetcher: &'a dyn Fetcher) -> Self {
        Self {
            ctx,
            fetcher,
            replay: no_replay,
        }
    }

    /// Use `replay` to parse legacy command lines found during resync.
    pub fn with_replay(mut self, replay: ReplayParser) -> Self {
        self.replay = replay;
        self
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Execute a request.
    ///
    /// # Errors
    ///
    /// Fails early, with no file touched, when the source is invalid, the
    /// fetch fails, the source holds no workflows, or there is nothing to
    /// resync. Per-file failures are in the returned report.
    pub async fn run(&self, request: &SyncRequest) -> Result<SyncReport, GhatError> {
        match &request.source {
            Some(source) => self.sync_source(source, &request.options).await,
            None => self.resync().await,
        }
    }

    /// Fetch `source` and merge every workflow it holds.
    pub async fn sync_source(
        &self,
        source: &str,
        options: &MergeOptions,
    ) -> Result<SyncReport, GhatError> {
        let verbosity = self.ctx.verbosity();
        let descriptor = SourceDescriptor::parse_with_default_host(source, self.ctx.default_host)?;
        output::debug(
            format!("fetching {} from {}", descriptor, descriptor.host),
            verbosity,
        );

        let staged = self.fetcher.fetch(&descriptor).await?;
        output::debug(format!("staged at {}", staged.root().display()), verbosity);
        let templates = discovery::discover(staged.root()).await?;
        if templates.is_empty() {
            return Err(GhatError::input(format!("No workflows found in {}", source)));
        }
        output::debug(
            format!("found {} workflow(s) in {}", templates.len(), source),
            verbosity,
        );

        let local_dir = self.ctx.local_workflows_dir();
        tokio::fs::create_dir_all(&local_dir)
            .await
            .map_err(|e| GhatError::io(&local_dir, e))?;

        let job = MergeJob::new(source, &descriptor.url, options);
        let merges = templates.iter().map(|template| {
            let remote = staged.root().join(template);
            let local = match template.file_name() {
                Some(name) => local_dir.join(name),
                None => local_dir.join(template),
            };
            async move {
                output::debug(
                    format!("merging {} into {}", template.display(), local.display()),
                    verbosity,
                );
                let result = merge::apply(&job, &remote, &local).await;
                FileOutcome::new(local, result)
            }
        });
        let outcomes = join_all(merges).await;

        drop(staged);
        Ok(SyncReport::from(outcomes))
    }

    async fn resync(&self) -> Result<SyncReport, GhatError> {
        let verbosity = self.ctx.verbosity();
        let recovered = resync::recover(&self.ctx).await?;
        if recovered.is_empty() {
            return Err(GhatError::input(
                "No source was specified and no existing ghat workflows were found in this repository",
            ));
        }

        let paths: Vec<String> = recovered
            .iter()
            .map(|entry| entry.path.display().to_string())
            .collect();
        output::print(
            format!(
                "Updating existing workflows:\n{}",
                output::format_list(&paths, "- ")
            ),
            verbosity,
        );

        let tasks = resync::plan(recovered);
        let runs = tasks.iter().map(|task| async move {
            let result = self.replay_task(task).await;
            (task, result)
        });

        let mut report = SyncReport::new();
        for (task, result) in join_all(runs).await {
            match result {
                Ok(sub_report) => report.extend(sub_report),
                Err(err) => {
                    let origin = task.origins.first().cloned().unwrap_or_else(PathBuf::new);
                    report.push(FileOutcome::new(origin, Err(err)));
                }
            }
        }
        Ok(report)
    }

    async fn replay_task(&self, task: &ResyncTask) -> Result<SyncReport, GhatError> {
        match &task.replay {
            Replay::Sync { source, options } => self.sync_source(source, options).await,
            Replay::Command { args } => {
                output::debug(format!("replaying `ghat {}`", args), self.ctx.verbosity());
                let request = (self.replay)(args)?;
                match &request.source {
                    Some(source) => self.sync_source(source, &request.options).await,
                    None => Err(GhatError::input(format!(
                        "legacy ghat command `{}` does not name a source",
                        args
                    ))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::MockFetcher;
    use crate::fetch::FetchError;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, text: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    fn quiet_ctx(root: &Path) -> Context {
        Context {
            cwd: Some(root.to_path_buf()),
            quiet: true,
            ..Context::default()
        }
    }

    fn request(source: &str) -> SyncRequest {
        SyncRequest::new(Some(source.to_string()), vec![], vec![], false).unwrap()
    }

    #[tokio::test]
    async fn syncs_every_template() {
        let remote = TempDir::new().unwrap();
        write(remote.path(), "a.yml", "name: A\n");
        write(remote.path(), "b.yaml", "name: B\n");
        let local = TempDir::new().unwrap();

        let fetcher = MockFetcher::new().with_tree("https://github.com/owner/repo", remote.path());
        let engine = Engine::new(quiet_ctx(local.path()), &fetcher);
        let report = engine.run(&request("owner/repo")).await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.written().len(), 2);
        assert!(local.path().join(".github/workflows/a.yml").exists());
        assert!(local.path().join(".github/workflows/b.yaml").exists());
    }

    #[tokio::test]
    async fn empty_source_is_input_error() {
        let remote = TempDir::new().unwrap();
        write(remote.path(), "README.md", "hi\n");
        let local = TempDir::new().unwrap();

        let fetcher = MockFetcher::new().with_tree("https://github.com/owner/repo", remote.path());
        let engine = Engine::new(quiet_ctx(local.path()), &fetcher);
        let err = engine.run(&request("owner/repo")).await.unwrap_err();

        assert!(err.is_user_error());
        assert_eq!(err.to_string(), "No workflows found in owner/repo");
        assert!(!local.path().join(".github").exists());
    }

    #[tokio::test]
    async fn fetch_failure_passes_through() {
        let local = TempDir::new().unwrap();
        let fetcher =
            MockFetcher::new().fail_with(FetchError::Network("connection reset".to_string()));
        let engine = Engine::new(quiet_ctx(local.path()), &fetcher);
        let err = engine.run(&request("owner/repo")).await.unwrap_err();

        assert!(matches!(err, GhatError::Transport(FetchError::Network(_))));
        assert!(!err.is_user_error());
    }

    #[tokio::test]
    async fn bad_source_never_fetches() {
        let local = TempDir::new().unwrap();
        let fetcher = MockFetcher::new();
        let engine = Engine::new(quiet_ctx(local.path()), &fetcher);

        let err = engine.run(&request("example.net/owner/repo")).await.unwrap_err();
        assert!(matches!(err, GhatError::UnsupportedHost { .. }));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn resync_without_records_is_input_error() {
        let local = TempDir::new().unwrap();
        write(local.path(), ".github/workflows/ci.yml", "on: push\n");
        let fetcher = MockFetcher::new();
        let engine = Engine::new(quiet_ctx(local.path()), &fetcher);

        let err = engine.run(&SyncRequest::resync()).await.unwrap_err();
        assert!(err.is_user_error());
        assert!(err.to_string().starts_with("No source was specified"));
    }

    #[tokio::test]
    async fn legacy_record_without_replay_parser_fails_that_record() {
        let local = TempDir::new().unwrap();
        write(
            local.path(),
            ".github/workflows/ci.yml",
            "# do not edit below - use `npx ghat owner/repo`\non: push\n",
        );
        let fetcher = MockFetcher::new();
        let engine = Engine::new(quiet_ctx(local.path()), &fetcher);

        let report = engine.run(&SyncRequest::resync()).await.unwrap();
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].workflow, PathBuf::from(".github/workflows/ci.yml"));
    }

    #[tokio::test]
    async fn replayed_command_without_source_is_rejected() {
        let local = TempDir::new().unwrap();
        write(
            local.path(),
            ".github/workflows/ci.yml",
            "# do not edit below - use `npx ghat --quiet`\non: push\n",
        );
        let fetcher = MockFetcher::new();
        let engine = Engine::new(quiet_ctx(local.path()), &fetcher)
            .with_replay(|_| Ok(SyncRequest::resync()));

        let report = engine.run(&SyncRequest::resync()).await.unwrap();
        let err = report.into_result(crate::ui::output::Verbosity::Quiet).unwrap_err();
        assert!(err.to_string().contains("does not name a source"));
        assert!(fetcher.requests().is_empty());
    }
}
