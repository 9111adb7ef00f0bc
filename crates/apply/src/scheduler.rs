//! Parallel action scheduling over the plan graph
//!
//! The coordinator is a single async loop: it owns the transient state
//! and the outcome table, dispatches build tasks under a semaphore and
//! applies every post-install update serially as completions arrive
//! over the channel. Workers only ever run the executor; they never
//! touch shared state.

use crate::executor::ActionExecutor;
use crate::messages;
use crate::outcome::Outcome;
use crate::ApplyCtx;
use garnet_errors::Error;
use garnet_events::{Event, EventSender, EventSenderExt};
use garnet_solver::{ActionGraph, Solution};
use garnet_state::TransientState;
use garnet_types::PackageId;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Walk the plan graph with `build_jobs` workers, returning one
/// outcome per node in plan order.
///
/// A node is dispatched only once every predecessor has settled; a
/// node with a non-success predecessor settles as `Cancelled` without
/// invoking the executor, which cancels its own dependents in turn.
///
/// # Errors
///
/// Returns `Error::Interrupted` when a worker reports a user
/// interrupt (after in-flight tasks have drained), or an internal
/// error if the graph is cyclic or the state flush fails.
pub async fn run(
    ctx: &ApplyCtx,
    solution: &Solution,
    transient: &mut TransientState,
    root_installs: &BTreeSet<String>,
) -> Result<Vec<Outcome>, Error> {
    let graph = &solution.to_process;
    let node_count = graph.len();

    if graph.has_cycles() {
        return Err(Error::internal("plan graph contains a cycle"));
    }

    let predecessors = graph.predecessors();
    let mut in_degree = graph.in_degrees();
    let mut outcomes: Vec<Option<Outcome>> = vec![None; node_count];
    let mut ready: VecDeque<usize> = (0..node_count).filter(|&i| in_degree[i] == 0).collect();

    let semaphore = Arc::new(Semaphore::new(ctx.config.build_jobs.max(1)));
    let (result_tx, mut result_rx) =
        tokio::sync::mpsc::unbounded_channel::<(usize, Result<(), Error>)>();
    let mut in_flight = 0usize;
    let mut interrupted = false;

    loop {
        // Dispatch everything whose predecessors have settled
        while let Some(index) = ready.pop_front() {
            let cancelled = interrupted
                || predecessors[index]
                    .iter()
                    .any(|&p| !outcomes[p].as_ref().is_some_and(Outcome::is_success));

            if cancelled {
                settle(graph, &mut outcomes, &mut in_degree, &mut ready, index, Outcome::Cancelled, &ctx.tx);
                continue;
            }

            let action = graph.node(index);
            if action.is_delete() {
                // Already handled by the removal stage
                settle(graph, &mut outcomes, &mut in_degree, &mut ready, index, Outcome::Success, &ctx.tx);
                continue;
            }

            let package = action.package().clone();
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| Error::internal("build semaphore closed"))?;

            ctx.tx.emit(Event::BuildStarting {
                package: package.clone(),
            });

            let executor: Arc<dyn ActionExecutor> = Arc::clone(&ctx.executor);
            let tx = result_tx.clone();
            in_flight += 1;
            tokio::spawn(async move {
                let result = executor.build_and_install(&package).await;
                drop(permit);
                let _ = tx.send((index, result));
            });
        }

        if in_flight == 0 {
            break;
        }

        let Some((index, result)) = result_rx.recv().await else {
            return Err(Error::internal("scheduler result channel closed"));
        };
        in_flight -= 1;

        let package = graph.node(index).package().clone();
        let outcome = match result {
            Ok(()) => {
                // Serialized post-install update: only this coordinator
                // mutates the transient state, and the store is flushed
                // before the node settles, so the persisted state is
                // always a valid prefix of some topological order.
                transient.record_install(&package, root_installs);
                ctx.state.flush(transient).await?;

                let metadata = if ctx.config.dry_run {
                    Ok(())
                } else {
                    ctx.executor.install_metadata(&package).await
                };

                match metadata {
                    Ok(()) => {
                        post_messages(ctx, &package, false);
                        Outcome::Success
                    }
                    Err(e) => {
                        post_messages(ctx, &package, true);
                        Outcome::Failed(e)
                    }
                }
            }
            Err(Error::Interrupted) => {
                ctx.tx.emit(Event::Aborting);
                interrupted = true;
                Outcome::Failed(Error::Interrupted)
            }
            Err(e) => {
                post_messages(ctx, &package, true);
                Outcome::Failed(e)
            }
        };

        settle(graph, &mut outcomes, &mut in_degree, &mut ready, index, outcome, &ctx.tx);
    }

    if interrupted {
        return Err(Error::Interrupted);
    }

    outcomes
        .into_iter()
        .map(|o| o.ok_or_else(|| Error::internal("scheduler left a node unsettled")))
        .collect()
}

/// Record a node outcome and release its dependents into the ready
/// queue once their last predecessor settles.
fn settle(
    graph: &ActionGraph,
    outcomes: &mut [Option<Outcome>],
    in_degree: &mut [usize],
    ready: &mut VecDeque<usize>,
    index: usize,
    outcome: Outcome,
    tx: &EventSender,
) {
    let action = graph.node(index).clone();
    match &outcome {
        Outcome::Success => tx.emit(Event::ActionCompleted { action }),
        Outcome::Failed(e) => tx.emit(Event::ActionFailed {
            action,
            error: e.to_string(),
        }),
        Outcome::Cancelled => tx.emit(Event::ActionCancelled { action }),
    }

    outcomes[index] = Some(outcome);

    for &dependent in graph.dependents(index) {
        in_degree[dependent] -= 1;
        if in_degree[dependent] == 0 {
            ready.push_back(dependent);
        }
    }
}

fn post_messages(ctx: &ApplyCtx, package: &PackageId, failed: bool) {
    messages::emit_post_messages(&*ctx.universe, &*ctx.eval, &ctx.tx, package, failed);
}
