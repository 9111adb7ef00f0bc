//! Package identity and atom types

use crate::{Version, VersionSpec};
use garnet_errors::VersionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a package: name plus exact version.
///
/// Names preserve their canonical capitalisation for display and
/// storage; user input is matched case-insensitively (see
/// [`name_eq_ignore_case`]).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageId {
    pub name: String,
    pub version: Version,
}

impl PackageId {
    /// Create a new package ID
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// Compare two package names case-insensitively (ASCII)
#[must_use]
pub fn name_eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// An atom: a package name with an optional version constraint.
///
/// This is the solver's input currency; user-supplied atoms go through
/// sanitisation before the solver sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    pub version_spec: VersionSpec,
}

impl PackageSpec {
    /// An atom with no version constraint
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_spec: VersionSpec::any(),
        }
    }

    /// Parse an atom from a string (e.g. `jq>=1.6.0,<2.0.0`)
    ///
    /// # Errors
    ///
    /// Returns `VersionError` if the specification string is malformed
    /// or contains an invalid version constraint.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        // Find the first constraint operator
        let operators = ["==", ">=", "<=", "!=", "=", ">", "<"];
        let mut split_pos = None;

        for op in &operators {
            if let Some(pos) = s.find(op) {
                match split_pos {
                    None => split_pos = Some(pos),
                    Some(sp) if pos < sp => split_pos = Some(pos),
                    Some(_) => {}
                }
            }
        }

        let (name, version_str) = if let Some(pos) = split_pos {
            (s[..pos].trim(), s[pos..].trim())
        } else {
            // No version constraint means any version
            (s.trim(), "*")
        };

        if name.is_empty() {
            return Err(VersionError::InvalidConstraint {
                input: s.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            version_spec: version_str.parse()?,
        })
    }

    /// Check whether an installed or candidate package satisfies this atom
    #[must_use]
    pub fn matches(&self, package: &PackageId) -> bool {
        name_eq_ignore_case(&self.name, &package.name) && self.version_spec.matches(&package.version)
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version_spec.is_any() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}{}", self.name, self.version_spec)
        }
    }
}
