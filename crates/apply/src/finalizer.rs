//! Deferred cleanup actions
//!
//! Stages push finalizer values as they commit work; the stack runs on
//! every exit path of the pipeline, last-in first-out. Finalizer
//! failures are reported as warnings and never mask the pipeline
//! result.

use crate::executor::ActionExecutor;
use garnet_events::{Event, EventSender, EventSenderExt};
use garnet_types::PackageId;

/// One deferred cleanup step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finalizer {
    /// Drop cached artefacts of a removed, non-pinned package
    CleanupArtifacts(PackageId),
}

/// LIFO stack of finalizers
#[derive(Debug, Default)]
pub struct FinalizerStack {
    items: Vec<Finalizer>,
}

impl FinalizerStack {
    /// Create an empty stack
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a finalizer
    pub fn push(&mut self, finalizer: Finalizer) {
        self.items.push(finalizer);
    }

    /// Number of pending finalizers
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the stack is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Run and drain all finalizers, last-in first-out
    pub async fn run(&mut self, executor: &dyn ActionExecutor, tx: &EventSender) {
        while let Some(finalizer) = self.items.pop() {
            match finalizer {
                Finalizer::CleanupArtifacts(package) => {
                    if let Err(e) = executor.cleanup_artifacts(&package).await {
                        tx.emit(Event::warning(format!(
                            "cleanup of {package} failed: {e}"
                        )));
                    }
                }
            }
        }
    }
}
