#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Action graph and solver seam for garnet
//!
//! The solver itself is an external collaborator; this crate defines
//! its output types (the [`Solution`] and its [`ActionGraph`]), the
//! [`Solver`] trait the apply engine calls, and the [`PackageUniverse`]
//! repository seam.

pub mod graph;
pub mod universe;

pub use graph::ActionGraph;
pub use universe::{PackageUniverse, RepositoryKind};

use async_trait::async_trait;
use garnet_errors::Error;
use garnet_types::{Action, ActionKind, PackageId, Request};
use std::collections::BTreeSet;
use std::fmt;

/// A resolved plan of package actions
#[derive(Debug, Clone, Default)]
pub struct Solution {
    /// The DAG of actions to execute
    pub to_process: ActionGraph,
}

impl Solution {
    /// Wrap an action graph into a solution
    #[must_use]
    pub fn new(to_process: ActionGraph) -> Self {
        Self { to_process }
    }

    /// Whether there is nothing to do
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_process.is_empty()
    }

    /// Names of every package touched by the plan
    #[must_use]
    pub fn package_names(&self) -> BTreeSet<String> {
        self.to_process
            .actions()
            .iter()
            .map(|a| a.package().name.clone())
            .collect()
    }

    /// Per-kind action counts
    #[must_use]
    pub fn stats(&self) -> ActionStats {
        let mut stats = ActionStats::default();
        for action in self.to_process.actions() {
            match action.kind() {
                ActionKind::Install => stats.install += 1,
                ActionKind::Upgrade => stats.upgrade += 1,
                ActionKind::Downgrade => stats.downgrade += 1,
                ActionKind::Recompile => stats.recompile += 1,
                ActionKind::Remove => stats.remove += 1,
            }
        }
        stats
    }
}

/// Per-kind counts for the preview
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionStats {
    pub install: usize,
    pub upgrade: usize,
    pub downgrade: usize,
    pub recompile: usize,
    pub remove: usize,
}

impl ActionStats {
    /// Total number of actions
    #[must_use]
    pub fn total(&self) -> usize {
        self.install + self.upgrade + self.downgrade + self.recompile + self.remove
    }
}

impl fmt::Display for ActionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (count, what) in [
            (self.install, "install"),
            (self.upgrade, "upgrade"),
            (self.downgrade, "downgrade"),
            (self.recompile, "recompile"),
            (self.remove, "remove"),
        ] {
            if count > 0 {
                parts.push(format!("{count} to {what}"));
            }
        }
        if parts.is_empty() {
            write!(f, "nothing to do")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Project the installed set forward under an all-success run of the
/// plan. Used by callers to preview the end state and by tests to
/// check the engine does not diverge from it.
#[must_use]
pub fn simulate_new_state(
    installed: &BTreeSet<PackageId>,
    solution: &Solution,
) -> BTreeSet<PackageId> {
    let mut projected = installed.clone();
    for action in solution.to_process.actions() {
        match action {
            Action::Change { previous, target } => {
                if let Some(prev) = previous {
                    projected.remove(prev);
                }
                projected.insert(target.clone());
            }
            Action::Recompile(p) => {
                projected.insert(p.clone());
            }
            Action::Delete(p) => {
                projected.remove(p);
            }
        }
    }
    projected
}

/// The dependency solver, an external collaborator
#[async_trait]
pub trait Solver: Send + Sync {
    /// Turn a request into a plan.
    ///
    /// `orphans` are installed packages no longer satisfied by the
    /// repository universe; the solver decides their fate.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::NoSolution` when the request cannot be
    /// satisfied; the conflict string explains why.
    async fn resolve(
        &self,
        request: &Request,
        orphans: &BTreeSet<PackageId>,
    ) -> Result<Solution, Error>;
}
