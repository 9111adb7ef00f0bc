#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Solution application engine for garnet
//!
//! Takes a resolved plan of package actions and executes it against
//! the local installation, in parallel where dependencies permit,
//! keeping the on-disk state consistent across failures and
//! interruptions. The pipeline is strictly staged: sources are fetched
//! first, removed packages go in one batch, then builds are scheduled
//! over the plan graph with bounded workers.

pub mod audit;
pub mod confirm;
pub mod download;
pub mod envwarn;
pub mod executor;
pub mod finalizer;
pub mod messages;
pub mod outcome;
pub mod remove;
pub mod report;
pub mod roots;
pub mod sanitize;
pub mod scheduler;
pub mod testing;

pub use audit::AuditSink;
pub use confirm::{Confirmation, Prompter};
pub use executor::{ActionExecutor, Artifact, RemovalStatus};
pub use messages::ManifestEval;
pub use outcome::Outcome;
pub use sanitize::{check_availability, sanitize_atoms, AvailabilityMode};

use download::FetchError;
use finalizer::FinalizerStack;
use garnet_errors::{Error, SolverError};
use garnet_events::{Event, EventSender, EventSenderExt};
use garnet_solver::{PackageUniverse, Solution, Solver};
use garnet_state::{StateManager, TransientState};
use garnet_types::{Action, PackageId, Request};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Process exit codes surfaced to the CLI layer
pub mod exit {
    /// Success, or a deliberate abort
    pub const SUCCESS: i32 = 0;
    /// The user declined the environment-variable warning
    pub const ENV_DECLINED: i32 = 1;
    /// The solver found no solution
    pub const NO_SOLUTION: i32 = 3;
    /// The apply pipeline reported failures
    pub const APPLY_ERROR: i32 = 4;
    /// User-supplied atoms cannot be satisfied
    pub const UNSATISFIABLE_ATOMS: i32 = 66;
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct ApplyConfig {
    /// Parallelism of the source pre-fetch stage
    pub download_jobs: usize,
    /// Parallelism of the build scheduler
    pub build_jobs: usize,
    /// Skip metadata registration and tolerate source misses
    pub dry_run: bool,
    /// Pretend mode: actions are simulated by the executor
    pub fake: bool,
    /// Preview and stop before any mutation
    pub show_only: bool,
    /// Never prompt; assume yes
    pub auto_confirm: bool,
    /// When set, emit OS dependency hints for these tags instead of
    /// acting
    pub external_tags: Option<BTreeSet<String>>,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            download_jobs: 4,
            build_jobs: 4,
            dry_run: false,
            fake: false,
            show_only: false,
            auto_confirm: false,
            external_tags: None,
        }
    }
}

impl ApplyConfig {
    /// Set download parallelism
    #[must_use]
    pub fn with_download_jobs(mut self, jobs: usize) -> Self {
        self.download_jobs = jobs;
        self
    }

    /// Set build parallelism
    #[must_use]
    pub fn with_build_jobs(mut self, jobs: usize) -> Self {
        self.build_jobs = jobs;
        self
    }

    /// Enable dry-run mode
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable show-only mode
    #[must_use]
    pub fn with_show_only(mut self, show_only: bool) -> Self {
        self.show_only = show_only;
        self
    }

    /// Enable auto-confirmation
    #[must_use]
    pub fn with_auto_confirm(mut self, auto_confirm: bool) -> Self {
        self.auto_confirm = auto_confirm;
        self
    }

    /// Enable external-tags mode with the configured tag set
    #[must_use]
    pub fn with_external_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.external_tags = Some(tags);
        self
    }
}

/// Engine context providing access to all collaborators
pub struct ApplyCtx {
    /// Per-package action executor
    pub executor: Arc<dyn ActionExecutor>,
    /// Repository universe
    pub universe: Arc<dyn PackageUniverse>,
    /// Filter evaluation and templating
    pub eval: Arc<dyn ManifestEval>,
    /// Interactive confirmation
    pub prompt: Arc<dyn Prompter>,
    /// Persistent state store
    pub state: StateManager,
    /// JSON audit sink
    pub audit: AuditSink,
    /// Engine configuration
    pub config: ApplyConfig,
    /// Event sender for all output
    pub tx: EventSender,
}

/// Final result of an apply
#[derive(Debug)]
pub enum FinalResult {
    /// Every action completed; carries the plan in node order
    Ok(Vec<Action>),
    /// The plan was empty
    NothingToDo,
    /// User declined, show-only, or external-tags mode
    Aborted,
    /// The solver could not satisfy the request
    NoSolution,
    /// At least one action failed
    Error {
        successful: Vec<Action>,
        failed: Vec<(Action, Error)>,
        remaining: Vec<Action>,
    },
}

impl FinalResult {
    /// Exit code the CLI should use for this result
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Ok(_) | Self::NothingToDo | Self::Aborted => exit::SUCCESS,
            Self::NoSolution => exit::NO_SOLUTION,
            Self::Error { .. } => exit::APPLY_ERROR,
        }
    }

    /// Whether the apply mutated state without failures
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_) | Self::NothingToDo)
    }
}

/// Resolve a request and apply the resulting plan.
///
/// On a solver conflict the conflict reason is emitted and
/// `NoSolution` returned; any other solver error propagates.
///
/// # Errors
///
/// Returns an error if the solver fails for a reason other than an
/// unsatisfiable request, or if the apply itself errors.
pub async fn resolve_and_apply(
    ctx: &ApplyCtx,
    solver: &dyn Solver,
    request: &Request,
    orphans: &BTreeSet<PackageId>,
    confirm: Confirmation,
) -> Result<FinalResult, Error> {
    match solver.resolve(request, orphans).await {
        Ok(solution) => apply(ctx, request, confirm, &solution).await,
        Err(Error::Solver(SolverError::NoSolution { conflict })) => {
            ctx.tx.emit(Event::error(conflict));
            Ok(FinalResult::NoSolution)
        }
        Err(e) => Err(e),
    }
}

/// Apply a resolved solution: preview, confirmation, then the
/// download → remove → schedule pipeline.
///
/// # Errors
///
/// Returns `Error::Exit(1)` when the user declines the environment
/// warning, `Error::Interrupted` on a user interrupt (after
/// finalizers ran), or any infrastructure error.
pub async fn apply(
    ctx: &ApplyCtx,
    request: &Request,
    confirm: Confirmation,
    solution: &Solution,
) -> Result<FinalResult, Error> {
    if solution.is_empty() {
        return Ok(FinalResult::NothingToDo);
    }

    let stats = solution.stats();
    ctx.tx.emit(Event::ApplyStarting {
        actions: stats.total(),
    });

    if let Some(tags) = &ctx.config.external_tags {
        let packages = external_deps(&*ctx.universe, solution, tags);
        ctx.tx.emit(Event::ExternalDeps { packages });
        return Ok(FinalResult::Aborted);
    }

    ctx.tx.emit(Event::ApplyPreview {
        lines: report::render_preview(&stats, solution.to_process.actions()),
    });

    let confirmed = match confirm {
        Confirmation::Yes => true,
        Confirmation::No => false,
        Confirmation::Ask => {
            if confirm::needs_prompt(
                &solution.package_names(),
                &request.requested,
                ctx.config.auto_confirm,
            ) {
                ctx.prompt.confirm(&format!("Proceed with {stats}?"))
            } else {
                true
            }
        }
    };
    if !confirmed {
        return Ok(FinalResult::Aborted);
    }

    if ctx.config.show_only {
        return Ok(FinalResult::Aborted);
    }

    let mut transient = ctx.state.load().await?;

    envwarn::warn_environment_once(
        &*ctx.universe,
        &transient,
        &*ctx.prompt,
        ctx.config.auto_confirm,
        &ctx.tx,
    )?;

    ctx.audit.solution(solution.to_process.actions()).await?;

    parallel_apply(ctx, request, solution, &mut transient).await
}

/// Run the pipeline stages with a finalizer stack that executes on
/// every exit path, including interrupts.
async fn parallel_apply(
    ctx: &ApplyCtx,
    request: &Request,
    solution: &Solution,
    transient: &mut TransientState,
) -> Result<FinalResult, Error> {
    let mut finalizers = FinalizerStack::new();
    let result = run_stages(ctx, request, solution, transient, &mut finalizers).await;
    finalizers.run(&*ctx.executor, &ctx.tx).await;
    result
}

async fn run_stages(
    ctx: &ApplyCtx,
    request: &Request,
    solution: &Solution,
    transient: &mut TransientState,
    finalizers: &mut FinalizerStack,
) -> Result<FinalResult, Error> {
    // Root names derive from the pre-apply roots, before the removal
    // stage subtracts anything.
    let root_installs = roots::root_install_names(&transient.installed_roots, request);

    // Stage 1: fetch all sources before any mutation
    match download::fetch_all(ctx, solution).await {
        Ok(downloads) => {
            if !downloads.missed.is_empty() && !(ctx.config.dry_run || ctx.config.fake) {
                let names: Vec<String> =
                    downloads.missed.iter().map(ToString::to_string).collect();
                ctx.tx.emit(Event::error(format!(
                    "could not fetch sources for: {}",
                    names.join(", ")
                )));
                return Ok(empty_error());
            }
            ctx.tx.emit(Event::debug(format!(
                "{} source(s) ready",
                downloads.artifacts.len()
            )));
        }
        Err(FetchError::Pool(message)) => {
            ctx.tx.emit(Event::error(message));
            return Ok(empty_error());
        }
        Err(FetchError::Other(e)) => return Err(e),
    }

    // Stage 2: bulk removal of replaced, recompiled and deleted
    // packages
    if let Some(result) = remove::remove_all(ctx, solution, transient, finalizers).await? {
        return Ok(result);
    }

    // Stage 3: scheduled builds over the plan graph
    let outcomes = scheduler::run(ctx, solution, transient, &root_installs).await?;
    let (successful, failed, remaining) =
        outcome::partition(solution.to_process.actions(), &outcomes);
    classify_and_report(ctx, successful, failed, remaining).await
}

/// An error result with nothing classified: the pipeline failed before
/// any action was attempted.
fn empty_error() -> FinalResult {
    FinalResult::Error {
        successful: Vec::new(),
        failed: Vec::new(),
        remaining: Vec::new(),
    }
}

/// Build the final result, emit the report and append audit records
/// for every failure.
pub(crate) async fn classify_and_report(
    ctx: &ApplyCtx,
    successful: Vec<Action>,
    failed: Vec<(Action, Error)>,
    remaining: Vec<Action>,
) -> Result<FinalResult, Error> {
    if failed.is_empty() && remaining.is_empty() {
        return Ok(FinalResult::Ok(successful));
    }

    let lines = report::render_error_report(&successful, &failed, &remaining);
    if !lines.is_empty() {
        ctx.tx.emit(Event::Report { lines });
    }

    for (action, error) in &failed {
        ctx.audit.action_error(action, error).await?;
    }

    Ok(FinalResult::Error {
        successful,
        failed,
        remaining,
    })
}

/// Union of the depext groups whose tag set is a subset of the
/// configured tags, across every package the plan touches.
fn external_deps(
    universe: &dyn PackageUniverse,
    solution: &Solution,
    tags: &BTreeSet<String>,
) -> Vec<String> {
    let mut packages = BTreeSet::new();
    for action in solution.to_process.actions() {
        if let Some(manifest) = universe.manifest(action.package()) {
            for group in &manifest.depexts {
                if group.tags.is_subset(tags) {
                    packages.extend(group.packages.iter().cloned());
                }
            }
        }
    }
    packages.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeUniverse;
    use garnet_solver::ActionGraph;
    use garnet_types::{Depext, Manifest, Version};

    fn pkg(name: &str, version: &str) -> PackageId {
        PackageId::new(name, Version::parse(version).unwrap())
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(FinalResult::NothingToDo.exit_code(), 0);
        assert_eq!(FinalResult::Aborted.exit_code(), 0);
        assert_eq!(FinalResult::NoSolution.exit_code(), 3);
        assert_eq!(
            FinalResult::Error {
                successful: vec![],
                failed: vec![],
                remaining: vec![],
            }
            .exit_code(),
            4
        );
    }

    #[test]
    fn test_external_deps_subset_rule() {
        let mut universe = FakeUniverse::new(vec![pkg("a", "1.0.0")]);
        let mut manifest = Manifest::new(pkg("a", "1.0.0"));
        manifest.depexts = vec![
            Depext {
                tags: ["debian".to_string()].into_iter().collect(),
                packages: vec!["libfoo-dev".to_string()],
            },
            Depext {
                tags: ["debian".to_string(), "arm64".to_string()]
                    .into_iter()
                    .collect(),
                packages: vec!["libfoo-arm".to_string()],
            },
        ];
        universe.set_manifest(manifest);

        let mut graph = ActionGraph::new();
        graph.add_node(Action::install(pkg("a", "1.0.0")));
        let solution = Solution::new(graph);

        // Only the group whose tags are all configured is included
        let tags: BTreeSet<String> = ["debian".to_string()].into_iter().collect();
        assert_eq!(
            external_deps(&universe, &solution, &tags),
            vec!["libfoo-dev".to_string()]
        );

        let tags: BTreeSet<String> = ["debian".to_string(), "arm64".to_string()]
            .into_iter()
            .collect();
        assert_eq!(
            external_deps(&universe, &solution, &tags),
            vec!["libfoo-arm".to_string(), "libfoo-dev".to_string()]
        );
    }
}
