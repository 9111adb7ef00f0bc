//! Atom sanitisation and availability checking
//!
//! Runs before any solver call: user-supplied atoms get canonical
//! capitalisation, then each atom is checked against the availability
//! set for the configured mode.

use crate::exit;
use garnet_errors::Error;
use garnet_events::{Event, EventSender, EventSenderExt};
use garnet_solver::PackageUniverse;
use garnet_types::{name_eq_ignore_case, PackageId, PackageSpec};
use std::collections::BTreeSet;

/// Which package pool atoms are validated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityMode {
    /// Available packages plus the installed set
    Strict,
    /// All known packages plus the installed set
    Permissive,
}

/// Rewrite each atom's name to its canonical capitalisation.
///
/// A name is rewritten only when exactly one known package matches it
/// case-insensitively; unknown or ambiguous names keep the
/// user-supplied form.
#[must_use]
pub fn sanitize_atoms(universe: &dyn PackageUniverse, atoms: &[PackageSpec]) -> Vec<PackageSpec> {
    let known = universe.package_names();

    atoms
        .iter()
        .map(|atom| {
            let matches: Vec<&String> = known
                .iter()
                .filter(|name| name_eq_ignore_case(name, &atom.name))
                .collect();
            match matches.as_slice() {
                [canonical] => PackageSpec {
                    name: (*canonical).clone(),
                    version_spec: atom.version_spec.clone(),
                },
                _ => atom.clone(),
            }
        })
        .collect()
}

/// Check every atom against the availability pool, emitting one
/// diagnostic per unsatisfied atom.
///
/// # Errors
///
/// Returns `Error::Exit(66)` if any atom is unsatisfied.
pub fn check_availability(
    universe: &dyn PackageUniverse,
    installed: &BTreeSet<PackageId>,
    atoms: &[PackageSpec],
    mode: AvailabilityMode,
    tx: &EventSender,
) -> Result<(), Error> {
    let mut pool = match mode {
        AvailabilityMode::Strict => universe.available_packages(),
        AvailabilityMode::Permissive => universe.all_packages(),
    };
    pool.extend(installed.iter().cloned());

    let known_names = universe.package_names();
    let mut unsatisfied = 0usize;

    for atom in atoms {
        if pool.iter().any(|p| atom.matches(p)) {
            continue;
        }
        unsatisfied += 1;

        let name_known = known_names
            .iter()
            .any(|name| name_eq_ignore_case(name, &atom.name))
            || installed
                .iter()
                .any(|p| name_eq_ignore_case(&p.name, &atom.name));

        if name_known {
            tx.emit(Event::error(format!(
                "{atom} is not available for this installation"
            )));
        } else {
            tx.emit(Event::error(format!("no package named {} found", atom.name)));
        }
    }

    if unsatisfied > 0 {
        return Err(Error::Exit(exit::UNSATISFIABLE_ATOMS));
    }
    Ok(())
}
