//! Package action executor seam
//!
//! The executor does the real work on a single package: fetching
//! sources, building, installing and removing. The engine drives it
//! per plan node and never touches package files itself.

use async_trait::async_trait;
use garnet_errors::Error;
use garnet_solver::Solution;
use garnet_types::PackageId;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A fetched source artifact, ready for the build step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub package: PackageId,
    pub path: PathBuf,
}

/// Outcome of the bulk removal stage.
///
/// The executor reports what it deleted even on failure so the engine
/// can classify the damage.
#[derive(Debug)]
pub enum RemovalStatus {
    Successful,
    Exception(Error),
}

/// The per-package action executor, an external collaborator
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Build and install one package. Metadata registration is a
    /// separate step ([`ActionExecutor::install_metadata`]) so the
    /// engine can serialise it with the state flush.
    async fn build_and_install(&self, package: &PackageId) -> Result<(), Error>;

    /// Remove, as one batch, every package the plan replaces,
    /// recompiles or deletes. Returns the set actually deleted and the
    /// removal status.
    async fn remove_all(
        &self,
        solution: &Solution,
    ) -> Result<(BTreeSet<PackageId>, RemovalStatus), Error>;

    /// Drop cached build artefacts of a removed package
    async fn cleanup_artifacts(&self, package: &PackageId) -> Result<(), Error>;

    /// Register an installed package's metadata, making it visible to
    /// future invocations
    async fn install_metadata(&self, package: &PackageId) -> Result<(), Error>;

    /// Fetch the source of one package; `None` is a cache/repository
    /// miss (not an error)
    async fn download(&self, package: &PackageId) -> Result<Option<Artifact>, Error>;

    /// The set of packages whose sources the plan needs (new installs
    /// and recompiles; not deletions)
    async fn sources_needed(&self, solution: &Solution) -> Result<BTreeSet<PackageId>, Error>;
}
