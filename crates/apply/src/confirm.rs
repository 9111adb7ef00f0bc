//! Confirmation gate before the pipeline runs

use std::collections::BTreeSet;

/// User prompt seam; the CLI implements this with a real terminal
/// prompt, tests with a canned answer.
pub trait Prompter: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Caller override for the confirmation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Prompt if needed
    Ask,
    Yes,
    No,
}

/// Whether a prompt must be issued.
///
/// The prompt is skipped only when the plan touches exactly the
/// packages the user named, or when auto-confirm is configured.
#[must_use]
pub fn needs_prompt(
    solution_names: &BTreeSet<String>,
    requested_names: &BTreeSet<String>,
    auto_confirm: bool,
) -> bool {
    !auto_confirm && solution_names != requested_names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_exact_match_skips_prompt() {
        assert!(!needs_prompt(&names(&["a"]), &names(&["a"]), false));
    }

    #[test]
    fn test_extra_packages_prompt() {
        assert!(needs_prompt(&names(&["a", "b"]), &names(&["a"]), false));
    }

    #[test]
    fn test_auto_confirm_skips_prompt() {
        assert!(!needs_prompt(&names(&["a", "b"]), &names(&["a"]), true));
    }
}
