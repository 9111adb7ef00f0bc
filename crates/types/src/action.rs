//! Plan actions
//!
//! An action is the unit the apply engine schedules: one package,
//! one mutation of the installation.

use crate::PackageId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A single planned mutation of the installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    /// Install `target` if `previous` is empty, otherwise replace
    /// `previous` with `target` (upgrade or downgrade by version order)
    Change {
        previous: Option<PackageId>,
        target: PackageId,
    },
    /// Rebuild the same version in place
    Recompile(PackageId),
    /// Remove the package
    Delete(PackageId),
}

/// Classification of an action for statistics and audit records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Install,
    Upgrade,
    Downgrade,
    Recompile,
    Remove,
}

impl Action {
    /// Shorthand for a fresh install
    #[must_use]
    pub fn install(target: PackageId) -> Self {
        Self::Change {
            previous: None,
            target,
        }
    }

    /// The package this action produces or removes.
    ///
    /// For `Change` this is the target; the previous version is
    /// available through [`Action::previous`].
    #[must_use]
    pub fn package(&self) -> &PackageId {
        match self {
            Self::Change { target, .. } => target,
            Self::Recompile(p) | Self::Delete(p) => p,
        }
    }

    /// The version being replaced, if any
    #[must_use]
    pub fn previous(&self) -> Option<&PackageId> {
        match self {
            Self::Change { previous, .. } => previous.as_ref(),
            Self::Recompile(_) | Self::Delete(_) => None,
        }
    }

    /// Classify the action by what it does to the installed set
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Change { previous: None, .. } => ActionKind::Install,
            Self::Change {
                previous: Some(prev),
                target,
            } => match target.version.cmp(&prev.version) {
                Ordering::Less => ActionKind::Downgrade,
                Ordering::Equal | Ordering::Greater => ActionKind::Upgrade,
            },
            Self::Recompile(_) => ActionKind::Recompile,
            Self::Delete(_) => ActionKind::Remove,
        }
    }

    /// Whether this action is handled by the bulk removal stage only
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete(_))
    }

    /// Progressive verb used in structured error lines
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self.kind() {
            ActionKind::Install => "installing",
            ActionKind::Upgrade => "upgrading to",
            ActionKind::Downgrade => "downgrading to",
            ActionKind::Recompile => "recompiling",
            ActionKind::Remove => "removing",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Change {
                previous: None,
                target,
            } => write!(f, "install {target}"),
            Self::Change {
                previous: Some(prev),
                target,
            } => {
                let direction = if target.version >= prev.version {
                    "upgrade"
                } else {
                    "downgrade"
                };
                write!(
                    f,
                    "{direction} {} from {} to {}",
                    target.name, prev.version, target.version
                )
            }
            Self::Recompile(p) => write!(f, "recompile {p}"),
            Self::Delete(p) => write!(f, "remove {p}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Version;

    fn pkg(name: &str, version: &str) -> PackageId {
        PackageId::new(name, Version::parse(version).unwrap())
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(Action::install(pkg("a", "1.0.0")).kind(), ActionKind::Install);
        assert_eq!(
            Action::Change {
                previous: Some(pkg("a", "1.0.0")),
                target: pkg("a", "2.0.0"),
            }
            .kind(),
            ActionKind::Upgrade
        );
        assert_eq!(
            Action::Change {
                previous: Some(pkg("a", "2.0.0")),
                target: pkg("a", "1.0.0"),
            }
            .kind(),
            ActionKind::Downgrade
        );
        assert_eq!(Action::Recompile(pkg("a", "1.0.0")).kind(), ActionKind::Recompile);
        assert_eq!(Action::Delete(pkg("a", "1.0.0")).kind(), ActionKind::Remove);
    }

    #[test]
    fn test_verbs() {
        assert_eq!(Action::install(pkg("a", "1.0.0")).verb(), "installing");
        assert_eq!(Action::Delete(pkg("a", "1.0.0")).verb(), "removing");
        assert_eq!(
            Action::Change {
                previous: Some(pkg("a", "1.0.0")),
                target: pkg("a", "0.9.0"),
            }
            .verb(),
            "downgrading to"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::install(pkg("a", "1.0.0")).to_string(), "install a-1.0.0");
        assert_eq!(
            Action::Change {
                previous: Some(pkg("a", "1.0.0")),
                target: pkg("a", "1.1.0"),
            }
            .to_string(),
            "upgrade a from 1.0.0 to 1.1.0"
        );
        assert_eq!(Action::Delete(pkg("a", "1.0.0")).to_string(), "remove a-1.0.0");
    }
}
