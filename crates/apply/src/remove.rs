//! Bulk removal stage
//!
//! Every package the plan replaces, recompiles or deletes is removed
//! in one batch before any install, so installs see a clean
//! filesystem.

use crate::executor::RemovalStatus;
use crate::finalizer::{Finalizer, FinalizerStack};
use crate::{classify_and_report, ApplyCtx, FinalResult};
use garnet_errors::Error;
use garnet_events::{Event, EventSenderExt};
use garnet_solver::Solution;
use garnet_state::TransientState;
use garnet_types::{Action, PackageId};
use std::collections::BTreeSet;

/// Run the removal stage.
///
/// On success, `Ok(None)`: the transient state has been updated and
/// flushed, and one cleanup finalizer per deleted non-pinned package
/// has been registered. On removal failure, `Ok(Some(result))` with a
/// classified error result; the scheduler must not run.
///
/// # Errors
///
/// Returns an error if the executor call itself, the state flush or
/// the report plumbing fails.
pub async fn remove_all(
    ctx: &ApplyCtx,
    solution: &Solution,
    transient: &mut TransientState,
    finalizers: &mut FinalizerStack,
) -> Result<Option<FinalResult>, Error> {
    let count = solution
        .to_process
        .actions()
        .iter()
        .filter(|a| match a {
            Action::Change { previous, .. } => previous.is_some(),
            Action::Recompile(_) | Action::Delete(_) => true,
        })
        .count();
    ctx.tx.emit(Event::RemovalStarting { count });

    let (deleted, status) = ctx.executor.remove_all(solution).await?;

    transient.record_removal(&deleted);
    ctx.state.flush(transient).await?;

    for package in &deleted {
        if !ctx.universe.is_pinned(&package.name) {
            finalizers.push(Finalizer::CleanupArtifacts(package.clone()));
        }
    }

    ctx.tx.emit(Event::RemovalCompleted {
        removed: deleted.iter().cloned().collect(),
    });

    match status {
        RemovalStatus::Successful => Ok(None),
        RemovalStatus::Exception(error) => {
            ctx.tx.emit(Event::error(format!("removal failed: {error}")));
            let (successful, failed, remaining) =
                classify_removal_failure(solution, &transient.installed, &error);
            let result = classify_and_report(ctx, successful, failed, remaining).await?;
            Ok(Some(result))
        }
    }
}

/// Classify the plan after a failed removal, without running installs.
///
/// A `Delete` whose package is gone counted as done; a `Change` or
/// `Recompile` whose old version is gone but whose new version was
/// never built is a failure; everything else was not reached.
fn classify_removal_failure(
    solution: &Solution,
    installed: &BTreeSet<PackageId>,
    error: &Error,
) -> (Vec<Action>, Vec<(Action, Error)>, Vec<Action>) {
    let mut successful = Vec::new();
    let mut failed = Vec::new();
    let mut remaining = Vec::new();

    for action in solution.to_process.actions() {
        match action {
            Action::Delete(p) if !installed.contains(p) => successful.push(action.clone()),
            Action::Change {
                previous: Some(prev),
                ..
            } if !installed.contains(prev) => failed.push((action.clone(), error.clone())),
            Action::Recompile(p) if !installed.contains(p) => {
                failed.push((action.clone(), error.clone()));
            }
            _ => remaining.push(action.clone()),
        }
    }

    (successful, failed, remaining)
}
