//! In-memory snapshot of the three package sets
//!
//! Mutated only by the apply coordinator (single-writer discipline);
//! workers never touch it. Every mutation is followed by a flush
//! through [`crate::StateManager`] so the on-disk store is always a
//! valid prefix of some topological order of the plan.

use garnet_types::PackageId;
use std::collections::BTreeSet;

/// The three package sets the engine tracks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransientState {
    /// Packages currently believed installed
    pub installed: BTreeSet<PackageId>,
    /// Subset of `installed` requested explicitly by the user
    pub installed_roots: BTreeSet<PackageId>,
    /// Packages marked for rebuild on the next apply
    pub reinstall: BTreeSet<PackageId>,
}

impl TransientState {
    /// Create an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed install, upgrade, downgrade or recompile.
    ///
    /// `root_installs` is the set of names that qualify as roots for
    /// this apply; membership decides whether the package joins
    /// `installed_roots`.
    pub fn record_install(&mut self, package: &PackageId, root_installs: &BTreeSet<String>) {
        self.installed.insert(package.clone());
        self.reinstall.remove(package);
        if root_installs.contains(&package.name) {
            self.installed_roots.insert(package.clone());
        }
    }

    /// Record a bulk removal: subtract `deleted` from all three sets
    pub fn record_removal(&mut self, deleted: &BTreeSet<PackageId>) {
        for package in deleted {
            self.installed.remove(package);
            self.installed_roots.remove(package);
            self.reinstall.remove(package);
        }
    }

    /// Whether a package with this exact name and version is installed
    #[must_use]
    pub fn is_installed(&self, package: &PackageId) -> bool {
        self.installed.contains(package)
    }

    /// Names of the current roots
    #[must_use]
    pub fn root_names(&self) -> BTreeSet<String> {
        self.installed_roots
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    /// Check the structural invariant: `installed_roots ⊆ installed`
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.installed_roots.is_subset(&self.installed)
    }
}
