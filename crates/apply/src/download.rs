//! Source pre-fetch stage
//!
//! Fetches sources for every package the plan touches before any
//! mutation happens, under bounded parallelism. A miss outside
//! dry-run/fake mode fails the whole apply before the removal stage.

use crate::executor::{ActionExecutor, Artifact};
use crate::ApplyCtx;
use garnet_errors::Error;
use garnet_events::{Event, EventSenderExt};
use garnet_solver::{RepositoryKind, Solution};
use garnet_types::PackageId;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Collected results of the download stage
#[derive(Debug, Default)]
pub struct DownloadOutcome {
    pub artifacts: Vec<Artifact>,
    pub missed: Vec<PackageId>,
}

/// How the stage failed
#[derive(Debug)]
pub enum FetchError {
    /// The worker pool itself failed (a task panicked or was aborted);
    /// the apply reports an empty classified error
    Pool(String),
    /// An executor error; surfaces to the caller unchanged
    Other(Error),
}

/// Fetch all needed sources with `download_jobs` parallelism.
///
/// Every fetch is attempted; per-package misses are collected rather
/// than short-circuiting so the user sees all of them at once.
///
/// # Errors
///
/// `FetchError::Pool` when the parallel primitive fails,
/// `FetchError::Other` when an executor call fails.
pub async fn fetch_all(ctx: &ApplyCtx, solution: &Solution) -> Result<DownloadOutcome, FetchError> {
    let needed = ctx
        .executor
        .sources_needed(solution)
        .await
        .map_err(FetchError::Other)?;
    if needed.is_empty() {
        return Ok(DownloadOutcome::default());
    }

    warm_cache(ctx, &needed).await;

    ctx.tx.emit(Event::DownloadStarting {
        count: needed.len(),
    });

    let semaphore = Arc::new(Semaphore::new(ctx.config.download_jobs.max(1)));
    let mut handles = Vec::with_capacity(needed.len());

    for package in needed {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FetchError::Pool("download semaphore closed".to_string()))?;
        let executor: Arc<dyn ActionExecutor> = Arc::clone(&ctx.executor);
        let tx = ctx.tx.clone();

        handles.push(tokio::spawn(async move {
            let result = executor.download(&package).await;
            match &result {
                Ok(Some(_)) => tx.emit(Event::DownloadCompleted {
                    package: package.clone(),
                }),
                Ok(None) => tx.emit(Event::DownloadMissed {
                    package: package.clone(),
                }),
                Err(_) => {}
            }
            drop(permit);
            (package, result)
        }));
    }

    let mut outcome = DownloadOutcome::default();
    for handle in handles {
        let (package, result) = handle
            .await
            .map_err(|e| FetchError::Pool(format!("download task failed: {e}")))?;
        match result.map_err(FetchError::Other)? {
            Some(artifact) => outcome.artifacts.push(artifact),
            None => outcome.missed.push(package),
        }
    }

    Ok(outcome)
}

/// Best-effort cache warm-up for packages served over HTTP that are
/// not locally pinned. Failures only cost the optimisation.
async fn warm_cache(ctx: &ApplyCtx, needed: &BTreeSet<PackageId>) {
    let names: BTreeSet<String> = needed
        .iter()
        .filter(|p| {
            ctx.universe.repository_kind(&p.name) == RepositoryKind::Http
                && !ctx.universe.is_locally_pinned(&p.name)
        })
        .map(|p| p.name.clone())
        .collect();

    if names.is_empty() {
        return;
    }

    if let Err(e) = ctx.universe.prefetch(&names).await {
        ctx.tx
            .emit(Event::debug(format!("cache warm-up failed: {e}")));
    }
}
