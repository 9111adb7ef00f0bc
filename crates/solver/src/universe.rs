//! Package universe seam
//!
//! The repository layer behind the solver and the apply engine. The
//! engine only needs lookups and a best-effort cache warm-up; the real
//! implementation lives with the repository client.

use async_trait::async_trait;
use garnet_errors::Error;
use garnet_types::{Manifest, PackageId};
use std::collections::BTreeSet;

/// Where a package's source comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    /// Remote HTTP repository; benefits from cache warm-up
    Http,
    /// Local directory or VCS checkout
    Local,
}

/// Read access to the package repositories
#[async_trait]
pub trait PackageUniverse: Send + Sync {
    /// Every package the repositories know about
    fn all_packages(&self) -> BTreeSet<PackageId>;

    /// Packages available on the current platform
    fn available_packages(&self) -> BTreeSet<PackageId>;

    /// All known package names, canonical capitalisation
    fn package_names(&self) -> BTreeSet<String> {
        self.all_packages().iter().map(|p| p.name.clone()).collect()
    }

    /// The manifest projection for a package, if known
    fn manifest(&self, package: &PackageId) -> Option<Manifest>;

    /// Whether the package's source is overridden locally
    fn is_pinned(&self, name: &str) -> bool;

    /// Whether the package is pinned to a local path (skips warm-up)
    fn is_locally_pinned(&self, name: &str) -> bool;

    /// Repository kind serving this package
    fn repository_kind(&self, name: &str) -> RepositoryKind;

    /// Warm the download cache for the named packages.
    ///
    /// Best-effort: the engine logs failures at debug level and
    /// proceeds without the optimisation.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache could not be primed.
    async fn prefetch(&self, names: &BTreeSet<String>) -> Result<(), Error>;
}
