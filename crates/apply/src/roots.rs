//! Root-name derivation for an apply
//!
//! A package installed during this apply joins `installed_roots` only
//! if its name is in the set computed here.

use garnet_types::{PackageId, Request, RequestKind};
use std::collections::BTreeSet;

/// Compute the names that qualify as roots for this apply.
///
/// Starts from the names of the current roots and unions in the
/// request's explicit names for install-like kinds. `Depends` and
/// `Remove` start from the empty set instead of the current roots.
#[must_use]
pub fn root_install_names(
    current_roots: &BTreeSet<PackageId>,
    request: &Request,
) -> BTreeSet<String> {
    let mut names: BTreeSet<String> = match request.kind {
        RequestKind::Depends | RequestKind::Remove => BTreeSet::new(),
        _ => current_roots.iter().map(|p| p.name.clone()).collect(),
    };

    match request.kind {
        RequestKind::Init | RequestKind::Install | RequestKind::Import | RequestKind::Switch => {
            names.extend(request.requested.iter().cloned());
        }
        RequestKind::Upgrade
        | RequestKind::Reinstall
        | RequestKind::Depends
        | RequestKind::Remove => {}
    }

    names
}
