//! Manifest fields consulted by the apply engine
//!
//! The full package manifest lives with the package sources; the engine
//! only reads the pieces modelled here: post-install messages, the
//! external-dependency map and environment updates.

use crate::PackageId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An opaque filter expression, interpreted by the external evaluator.
///
/// The engine never inspects the expression itself; it only injects the
/// `success`/`failure` bindings and asks the evaluator for a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(pub String);

impl Filter {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }
}

/// A message template shown after the package's action ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMessage {
    pub template: String,
    /// Shown only when the filter evaluates to true; `None` always shows
    pub filter: Option<Filter>,
}

/// A group of OS-level dependency hints, guarded by distribution tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depext {
    /// The tag set guarding this group (e.g. distro identifiers)
    pub tags: BTreeSet<String>,
    /// System packages to suggest when the guard matches
    pub packages: Vec<String>,
}

/// How an environment update combines with an existing value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvOp {
    /// Plain assignment; only these count for interference warnings
    Set,
    Append,
    Prepend,
}

/// A single environment variable update declared by a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvUpdate {
    pub name: String,
    pub op: EnvOp,
    pub value: String,
}

/// The manifest projection the engine consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub package: PackageId,
    #[serde(default)]
    pub post_messages: Vec<PostMessage>,
    #[serde(default)]
    pub depexts: Vec<Depext>,
    #[serde(default)]
    pub env_updates: Vec<EnvUpdate>,
    /// Whether this package provides a compiler toolchain
    #[serde(default)]
    pub is_compiler: bool,
}

impl Manifest {
    /// An empty manifest for a package
    #[must_use]
    pub fn new(package: PackageId) -> Self {
        Self {
            package,
            post_messages: Vec::new(),
            depexts: Vec::new(),
            env_updates: Vec::new(),
            is_compiler: false,
        }
    }

    /// Names of variables this manifest assigns with `EnvOp::Set`
    #[must_use]
    pub fn assigned_variables(&self) -> BTreeSet<String> {
        self.env_updates
            .iter()
            .filter(|u| u.op == EnvOp::Set)
            .map(|u| u.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Version;

    #[test]
    fn test_assigned_variables_only_counts_set() {
        let mut manifest = Manifest::new(PackageId::new(
            "cc",
            Version::parse("1.0.0").unwrap(),
        ));
        manifest.env_updates = vec![
            EnvUpdate {
                name: "CC_PREFIX".to_string(),
                op: EnvOp::Set,
                value: "/usr/local".to_string(),
            },
            EnvUpdate {
                name: "PATH".to_string(),
                op: EnvOp::Prepend,
                value: "/usr/local/bin".to_string(),
            },
        ];

        let vars = manifest.assigned_variables();
        assert!(vars.contains("CC_PREFIX"));
        assert!(!vars.contains("PATH"));
    }
}
