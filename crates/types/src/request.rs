//! User request types
//!
//! The request kind decides how root packages are derived for an apply
//! (see the engine's roots module) and feeds the solver.

use crate::PackageSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// First-time setup of an installation prefix
    Init,
    Install,
    /// Restore a previously exported installed set
    Import,
    /// Switch the active installation to another prefix
    Switch,
    Upgrade,
    Reinstall,
    /// Query-style request that still produces a plan
    Depends,
    Remove,
}

/// A resolved-and-sanitised user request handed to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub kind: RequestKind,
    /// Canonical names the user explicitly asked for
    pub requested: BTreeSet<String>,
    /// The sanitised atoms forwarded to the solver
    pub atoms: Vec<PackageSpec>,
}

impl Request {
    /// Create a request from a kind and explicit names
    #[must_use]
    pub fn new(kind: RequestKind, requested: BTreeSet<String>) -> Self {
        Self {
            kind,
            requested,
            atoms: Vec::new(),
        }
    }

    /// Attach solver atoms
    #[must_use]
    pub fn with_atoms(mut self, atoms: Vec<PackageSpec>) -> Self {
        self.atoms = atoms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_construction() {
        let request = Request::new(
            RequestKind::Install,
            ["jq".to_string()].into_iter().collect(),
        )
        .with_atoms(vec![PackageSpec::parse("jq>=1.6.0").unwrap()]);

        assert_eq!(request.kind, RequestKind::Install);
        assert!(request.requested.contains("jq"));
        assert_eq!(request.atoms.len(), 1);
    }
}
