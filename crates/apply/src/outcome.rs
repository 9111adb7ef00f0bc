//! Node outcomes and result classification
//!
//! Cancellation is a value, not an exception: a node whose predecessor
//! failed records `Cancelled` without the executor ever running, and
//! its own dependents observe that and cancel in turn.

use garnet_errors::Error;
use garnet_types::Action;

/// The three-valued result of one plan node
#[derive(Debug, Clone)]
pub enum Outcome {
    Success,
    Failed(Error),
    /// A predecessor failed; the executor was not invoked
    Cancelled,
}

impl Outcome {
    /// Whether the node completed successfully
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Partition node results into successful, failed and remaining
/// (cancelled) actions, preserving plan order within each class.
#[must_use]
pub fn partition(
    actions: &[Action],
    outcomes: &[Outcome],
) -> (Vec<Action>, Vec<(Action, Error)>, Vec<Action>) {
    let mut successful = Vec::new();
    let mut failed = Vec::new();
    let mut remaining = Vec::new();

    for (action, outcome) in actions.iter().zip(outcomes) {
        match outcome {
            Outcome::Success => successful.push(action.clone()),
            Outcome::Failed(error) => failed.push((action.clone(), error.clone())),
            Outcome::Cancelled => remaining.push(action.clone()),
        }
    }

    (successful, failed, remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use garnet_types::{PackageId, Version};

    fn install(name: &str) -> Action {
        Action::install(PackageId::new(name, Version::parse("1.0.0").unwrap()))
    }

    #[test]
    fn test_partition_preserves_order() {
        let actions = vec![install("a"), install("b"), install("c"), install("d")];
        let outcomes = vec![
            Outcome::Success,
            Outcome::Failed(Error::internal("boom")),
            Outcome::Cancelled,
            Outcome::Success,
        ];

        let (successful, failed, remaining) = partition(&actions, &outcomes);

        assert_eq!(successful, vec![install("a"), install("d")]);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, install("b"));
        assert_eq!(remaining, vec![install("c")]);
    }

    #[test]
    fn test_partition_covers_every_node() {
        let actions = vec![install("a"), install("b")];
        let outcomes = vec![Outcome::Success, Outcome::Cancelled];

        let (successful, failed, remaining) = partition(&actions, &outcomes);
        assert_eq!(successful.len() + failed.len() + remaining.len(), actions.len());
    }
}
