//! Post-install messaging
//!
//! After a package's action ran, its manifest may ask for messages to
//! be shown. Filters are evaluated by the external filter-language
//! collaborator with `success`/`failure` injected.

use garnet_events::{Event, EventSender, EventSenderExt};
use garnet_solver::PackageUniverse;
use garnet_types::{Filter, PackageId};
use std::collections::HashMap;

/// Filter evaluation and template substitution seam
pub trait ManifestEval: Send + Sync {
    /// Evaluate a message filter under the given boolean bindings
    fn eval_filter(&self, bindings: &HashMap<String, bool>, filter: &Filter) -> bool;

    /// Substitute variables into a message template
    fn substitute(&self, bindings: &HashMap<String, bool>, template: &str) -> String;
}

/// Emit the package's post messages for a finished action.
///
/// `failed` selects the filter bindings (`success = !failed`,
/// `failure = failed`) and is carried on the event so the CLI can tint
/// the header.
pub fn emit_post_messages(
    universe: &dyn PackageUniverse,
    eval: &dyn ManifestEval,
    tx: &EventSender,
    package: &PackageId,
    failed: bool,
) {
    let Some(manifest) = universe.manifest(package) else {
        return;
    };
    if manifest.post_messages.is_empty() {
        return;
    }

    let bindings: HashMap<String, bool> = [
        ("success".to_string(), !failed),
        ("failure".to_string(), failed),
    ]
    .into_iter()
    .collect();

    for message in &manifest.post_messages {
        let shown = message
            .filter
            .as_ref()
            .map_or(true, |f| eval.eval_filter(&bindings, f));
        if !shown {
            continue;
        }

        let body = eval.substitute(&bindings, &message.template);
        tx.emit(Event::PostMessage {
            package: package.clone(),
            lines: indent_lines(&body),
            failed,
        });
    }
}

/// Indent a message body consistently with its leading marker: the
/// first line carries the marker, continuation lines align under it.
fn indent_lines(body: &str) -> Vec<String> {
    body.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("=> {line}")
            } else {
                format!("   {line}")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_aligns_continuation_lines() {
        let lines = indent_lines("first\nsecond\nthird");
        assert_eq!(lines, vec!["=> first", "   second", "   third"]);
    }

    #[test]
    fn test_indent_single_line() {
        assert_eq!(indent_lines("only"), vec!["=> only"]);
    }
}
