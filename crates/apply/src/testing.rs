//! Test doubles for the engine's collaborator seams
//!
//! Used by this crate's own tests and by downstream integration
//! harnesses: a scriptable executor, an in-memory package universe, a
//! canned prompter and a trivial filter evaluator.

#![allow(clippy::missing_panics_doc)]

use crate::confirm::Prompter;
use crate::executor::{ActionExecutor, Artifact, RemovalStatus};
use crate::messages::ManifestEval;
use async_trait::async_trait;
use garnet_errors::{Error, SolverError};
use garnet_solver::{PackageUniverse, RepositoryKind, Solution, Solver};
use garnet_types::{Action, Filter, Manifest, PackageId, Request};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory package universe
#[derive(Default)]
pub struct FakeUniverse {
    packages: BTreeSet<PackageId>,
    available: BTreeSet<PackageId>,
    manifests: HashMap<PackageId, Manifest>,
    pinned: BTreeSet<String>,
    locally_pinned: BTreeSet<String>,
    local_repos: BTreeSet<String>,
    prefetch_fails: bool,
    prefetch_calls: AtomicUsize,
}

impl FakeUniverse {
    /// Universe where every given package is also available
    #[must_use]
    pub fn new(packages: Vec<PackageId>) -> Self {
        let packages: BTreeSet<PackageId> = packages.into_iter().collect();
        Self {
            available: packages.clone(),
            packages,
            ..Self::default()
        }
    }

    /// Register or replace a manifest
    pub fn set_manifest(&mut self, manifest: Manifest) {
        self.manifests.insert(manifest.package.clone(), manifest);
    }

    /// Mark a package as pinned
    pub fn pin(&mut self, name: &str) {
        self.pinned.insert(name.to_string());
    }

    /// Mark a package as pinned to a local path
    pub fn pin_locally(&mut self, name: &str) {
        self.locally_pinned.insert(name.to_string());
        self.pinned.insert(name.to_string());
    }

    /// Serve a package from a local repository instead of HTTP
    pub fn serve_locally(&mut self, name: &str) {
        self.local_repos.insert(name.to_string());
    }

    /// Make `prefetch` fail
    pub fn fail_prefetch(&mut self) {
        self.prefetch_fails = true;
    }

    /// Number of `prefetch` calls observed
    #[must_use]
    pub fn prefetch_calls(&self) -> usize {
        self.prefetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PackageUniverse for FakeUniverse {
    fn all_packages(&self) -> BTreeSet<PackageId> {
        self.packages.clone()
    }

    fn available_packages(&self) -> BTreeSet<PackageId> {
        self.available.clone()
    }

    fn manifest(&self, package: &PackageId) -> Option<Manifest> {
        self.manifests.get(package).cloned()
    }

    fn is_pinned(&self, name: &str) -> bool {
        self.pinned.contains(name)
    }

    fn is_locally_pinned(&self, name: &str) -> bool {
        self.locally_pinned.contains(name)
    }

    fn repository_kind(&self, name: &str) -> RepositoryKind {
        if self.local_repos.contains(name) {
            RepositoryKind::Local
        } else {
            RepositoryKind::Http
        }
    }

    async fn prefetch(&self, _names: &BTreeSet<String>) -> Result<(), Error> {
        self.prefetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.prefetch_fails {
            Err(Error::internal("prefetch unavailable"))
        } else {
            Ok(())
        }
    }
}

/// Executor whose behaviour is scripted per package name
#[derive(Default)]
pub struct ScriptedExecutor {
    build_failures: HashMap<String, Error>,
    missing_sources: BTreeSet<String>,
    removal_error: Option<Error>,
    removal_deletes: Option<BTreeSet<PackageId>>,
    built: Mutex<Vec<String>>,
    metadata_installed: Mutex<Vec<String>>,
    cleaned: Mutex<Vec<PackageId>>,
    downloads: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `build_and_install` for the named package
    #[must_use]
    pub fn fail_build(mut self, name: &str, error: Error) -> Self {
        self.build_failures.insert(name.to_string(), error);
        self
    }

    /// Report a user interrupt while building the named package
    #[must_use]
    pub fn interrupt_build(mut self, name: &str) -> Self {
        self.build_failures
            .insert(name.to_string(), Error::Interrupted);
        self
    }

    /// Make the source fetch for the named package miss
    #[must_use]
    pub fn missing_source(mut self, name: &str) -> Self {
        self.missing_sources.insert(name.to_string());
        self
    }

    /// Fail the bulk removal after deleting `deleted`
    #[must_use]
    pub fn fail_removal_after(mut self, error: Error, deleted: BTreeSet<PackageId>) -> Self {
        self.removal_error = Some(error);
        self.removal_deletes = Some(deleted);
        self
    }

    /// Names built so far, in completion order
    #[must_use]
    pub fn built(&self) -> Vec<String> {
        self.built.lock().unwrap().clone()
    }

    /// Names whose metadata was registered
    #[must_use]
    pub fn metadata_installed(&self) -> Vec<String> {
        self.metadata_installed.lock().unwrap().clone()
    }

    /// Packages whose artefacts were cleaned up by finalizers
    #[must_use]
    pub fn cleaned(&self) -> Vec<PackageId> {
        self.cleaned.lock().unwrap().clone()
    }

    /// Names downloaded so far
    #[must_use]
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    /// Packages the plan removes: replaced versions, recompile targets
    /// and deletions
    fn planned_removals(solution: &Solution) -> BTreeSet<PackageId> {
        solution
            .to_process
            .actions()
            .iter()
            .filter_map(|action| match action {
                Action::Change {
                    previous: Some(prev),
                    ..
                } => Some(prev.clone()),
                Action::Change { previous: None, .. } => None,
                Action::Recompile(p) | Action::Delete(p) => Some(p.clone()),
            })
            .collect()
    }
}

#[async_trait]
impl ActionExecutor for ScriptedExecutor {
    async fn build_and_install(&self, package: &PackageId) -> Result<(), Error> {
        if let Some(error) = self.build_failures.get(&package.name) {
            return Err(error.clone());
        }
        self.built.lock().unwrap().push(package.name.clone());
        Ok(())
    }

    async fn remove_all(
        &self,
        solution: &Solution,
    ) -> Result<(BTreeSet<PackageId>, RemovalStatus), Error> {
        match &self.removal_error {
            Some(error) => {
                let deleted = self.removal_deletes.clone().unwrap_or_default();
                Ok((deleted, RemovalStatus::Exception(error.clone())))
            }
            None => Ok((
                Self::planned_removals(solution),
                RemovalStatus::Successful,
            )),
        }
    }

    async fn cleanup_artifacts(&self, package: &PackageId) -> Result<(), Error> {
        self.cleaned.lock().unwrap().push(package.clone());
        Ok(())
    }

    async fn install_metadata(&self, package: &PackageId) -> Result<(), Error> {
        self.metadata_installed
            .lock()
            .unwrap()
            .push(package.name.clone());
        Ok(())
    }

    async fn download(&self, package: &PackageId) -> Result<Option<Artifact>, Error> {
        self.downloads.lock().unwrap().push(package.name.clone());
        if self.missing_sources.contains(&package.name) {
            return Ok(None);
        }
        Ok(Some(Artifact {
            package: package.clone(),
            path: PathBuf::from(format!("/tmp/{}.src", package.name)),
        }))
    }

    async fn sources_needed(&self, solution: &Solution) -> Result<BTreeSet<PackageId>, Error> {
        Ok(solution
            .to_process
            .actions()
            .iter()
            .filter_map(|action| match action {
                Action::Change { target, .. } => Some(target.clone()),
                Action::Recompile(p) => Some(p.clone()),
                Action::Delete(_) => None,
            })
            .collect())
    }
}

/// Prompter answering every prompt the same way, counting prompts
#[derive(Debug)]
pub struct CannedPrompter {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl CannedPrompter {
    #[must_use]
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of prompts issued
    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl Prompter for CannedPrompter {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}

/// Solver returning a canned result, ignoring the request
pub struct CannedSolver {
    result: Result<Solution, Error>,
}

impl CannedSolver {
    /// Always resolve to the given solution
    #[must_use]
    pub fn solution(solution: Solution) -> Self {
        Self {
            result: Ok(solution),
        }
    }

    /// Always report an unsatisfiable request
    #[must_use]
    pub fn conflict(reason: &str) -> Self {
        Self {
            result: Err(SolverError::NoSolution {
                conflict: reason.to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl Solver for CannedSolver {
    async fn resolve(
        &self,
        _request: &Request,
        _orphans: &BTreeSet<PackageId>,
    ) -> Result<Solution, Error> {
        self.result.clone()
    }
}

/// Evaluator where a filter expression is simply a binding name.
///
/// Unknown names evaluate to true; substitution replaces `%{name}%`
/// with the binding's boolean value.
#[derive(Debug, Default, Clone, Copy)]
pub struct BindingEval;

impl ManifestEval for BindingEval {
    fn eval_filter(&self, bindings: &HashMap<String, bool>, filter: &Filter) -> bool {
        bindings.get(filter.0.as_str()).copied().unwrap_or(true)
    }

    fn substitute(&self, bindings: &HashMap<String, bool>, template: &str) -> String {
        let mut out = template.to_string();
        for (name, value) in bindings {
            out = out.replace(&format!("%{{{name}}}%"), &value.to_string());
        }
        out
    }
}
