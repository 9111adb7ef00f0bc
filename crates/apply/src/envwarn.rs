//! Environment interference warnings
//!
//! Certain process-environment variables override what the installed
//! toolchain or compiler would otherwise pick up. The check runs at
//! most once per process, before the first pipeline run.

use crate::confirm::Prompter;
use crate::exit;
use garnet_errors::Error;
use garnet_events::{Event, EventSender, EventSenderExt};
use garnet_solver::PackageUniverse;
use garnet_state::TransientState;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// Toolchain packages and the variables that override their behaviour.
/// A variable is only suspicious when the corresponding package is
/// actually installed.
const TOOLCHAIN_VARS: &[(&str, &[&str])] = &[
    ("cc", &["CPATH", "C_INCLUDE_PATH", "LIBRARY_PATH"]),
    ("ld", &["LD_LIBRARY_PATH", "DYLD_LIBRARY_PATH"]),
    ("pkg-config", &["PKG_CONFIG_PATH"]),
];

static WARNED: OnceLock<()> = OnceLock::new();

/// Compute the interfering variables present in `env`.
///
/// Two sources: the fixed toolchain list (gated on the package being
/// installed), and assignments declared by non-current compiler
/// manifests that the current compiler does not also assign.
#[must_use]
pub fn interfering_variables(
    universe: &dyn PackageUniverse,
    state: &TransientState,
    env: &HashMap<String, String>,
) -> Vec<String> {
    let mut candidates: BTreeSet<String> = BTreeSet::new();

    for (package, vars) in TOOLCHAIN_VARS {
        if state.installed.iter().any(|p| p.name == *package) {
            candidates.extend(vars.iter().map(ToString::to_string));
        }
    }

    let compilers: Vec<_> = universe
        .all_packages()
        .iter()
        .filter_map(|p| universe.manifest(p))
        .filter(|m| m.is_compiler)
        .collect();
    let current = compilers
        .iter()
        .find(|m| state.installed.contains(&m.package));
    let current_vars = current.map(|m| m.assigned_variables()).unwrap_or_default();

    for manifest in &compilers {
        if current.is_some_and(|c| c.package == manifest.package) {
            continue;
        }
        for var in manifest.assigned_variables() {
            if !current_vars.contains(&var) {
                candidates.insert(var);
            }
        }
    }

    candidates
        .into_iter()
        .filter(|name| env.contains_key(name))
        .collect()
}

/// Warn about interfering environment variables, at most once per
/// process, and ask the user whether to continue.
///
/// # Errors
///
/// Returns `Error::Exit(1)` if the user declines.
pub fn warn_environment_once(
    universe: &dyn PackageUniverse,
    state: &TransientState,
    prompt: &dyn Prompter,
    auto_confirm: bool,
    tx: &EventSender,
) -> Result<(), Error> {
    if WARNED.set(()).is_err() {
        // Already ran in this process
        return Ok(());
    }

    let env: HashMap<String, String> = std::env::vars().collect();
    let variables = interfering_variables(universe, state, &env);
    if variables.is_empty() {
        return Ok(());
    }

    tx.emit(Event::EnvWarning {
        variables: variables.clone(),
    });

    if auto_confirm || prompt.confirm("These variables may interfere; continue?") {
        Ok(())
    } else {
        Err(Error::Exit(exit::ENV_DECLINED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeUniverse;
    use garnet_types::{EnvOp, EnvUpdate, Manifest, PackageId, Version};

    fn pkg(name: &str, version: &str) -> PackageId {
        PackageId::new(name, Version::parse(version).unwrap())
    }

    fn compiler_manifest(name: &str, vars: &[&str]) -> Manifest {
        let mut manifest = Manifest::new(pkg(name, "1.0.0"));
        manifest.is_compiler = true;
        manifest.env_updates = vars
            .iter()
            .map(|v| EnvUpdate {
                name: (*v).to_string(),
                op: EnvOp::Set,
                value: "x".to_string(),
            })
            .collect();
        manifest
    }

    #[test]
    fn test_toolchain_vars_require_installed_package() {
        let universe = FakeUniverse::new(vec![]);
        let mut state = TransientState::new();
        let env: HashMap<String, String> =
            [("CPATH".to_string(), "/usr/include".to_string())].into();

        // cc not installed: no warning
        assert!(interfering_variables(&universe, &state, &env).is_empty());

        state.installed.insert(pkg("cc", "1.0.0"));
        assert_eq!(
            interfering_variables(&universe, &state, &env),
            vec!["CPATH".to_string()]
        );
    }

    #[test]
    fn test_other_compiler_assignments_flagged() {
        let mut universe = FakeUniverse::new(vec![pkg("stablec", "1.0.0"), pkg("fastc", "1.0.0")]);
        universe.set_manifest(compiler_manifest("stablec", &["STABLEC_PREFIX"]));
        universe.set_manifest(compiler_manifest("fastc", &["FASTC_PREFIX"]));

        let mut state = TransientState::new();
        state.installed.insert(pkg("stablec", "1.0.0"));

        let env: HashMap<String, String> = [
            ("STABLEC_PREFIX".to_string(), "/opt/a".to_string()),
            ("FASTC_PREFIX".to_string(), "/opt/b".to_string()),
        ]
        .into();

        // Only the non-current compiler's assignment interferes
        assert_eq!(
            interfering_variables(&universe, &state, &env),
            vec!["FASTC_PREFIX".to_string()]
        );
    }

    #[test]
    fn test_unset_variables_not_reported() {
        let universe = FakeUniverse::new(vec![]);
        let mut state = TransientState::new();
        state.installed.insert(pkg("cc", "1.0.0"));

        let env = HashMap::new();
        assert!(interfering_variables(&universe, &state, &env).is_empty());
    }
}
