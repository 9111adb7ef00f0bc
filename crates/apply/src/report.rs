//! User-facing report rendering
//!
//! The engine renders line lists and emits them as events; colouring
//! and terminal handling belong to the CLI.

use garnet_errors::Error;
use garnet_solver::ActionStats;
use garnet_types::Action;

/// Preview of the plan, shown before confirmation
#[must_use]
pub fn render_preview(stats: &ActionStats, actions: &[Action]) -> Vec<String> {
    let mut lines = vec!["The following actions will be performed:".to_string()];
    lines.extend(actions.iter().map(|a| format!("  - {a}")));
    lines.push(format!("  ({stats})"));
    lines
}

/// One structured error line, keyed by the action verb
#[must_use]
pub fn error_line(action: &Action, error: &Error) -> String {
    format!("{} {}: {}", action.verb(), action.package(), error)
}

/// Render the error report.
///
/// The sectioned summary is emitted only when the plan involved at
/// least two actions; the per-failure error lines are always included.
#[must_use]
pub fn render_error_report(
    successful: &[Action],
    failed: &[(Action, Error)],
    remaining: &[Action],
) -> Vec<String> {
    let total = successful.len() + failed.len() + remaining.len();
    let mut lines = Vec::new();

    if total >= 2 {
        lines.push("Error report:".to_string());
        if !successful.is_empty() {
            lines.push("These actions have been completed successfully:".to_string());
            lines.extend(successful.iter().map(|a| format!("  - {a}")));
        }
        if !failed.is_empty() {
            lines.push("The following failed:".to_string());
            lines.extend(failed.iter().map(|(a, _)| format!("  - {a}")));
        }
        if !remaining.is_empty() {
            lines.push("Due to the errors, the following have been cancelled:".to_string());
            lines.extend(remaining.iter().map(|a| format!("  - {a}")));
        }
    }

    for (action, error) in failed {
        lines.push(error_line(action, error));
    }

    lines
}
