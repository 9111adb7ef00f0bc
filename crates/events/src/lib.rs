#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in garnet
//!
//! This crate provides the event types and channel aliases used for
//! communication between crates. All output goes through events - no
//! direct logging or printing is allowed outside the CLI.

use garnet_types::{Action, PackageId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type alias for event sender
pub type EventSender = tokio::sync::mpsc::UnboundedSender<Event>;

/// Type alias for event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<Event>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Core event enum for all async communication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // Apply lifecycle
    ApplyStarting {
        actions: usize,
    },
    ApplyPreview {
        lines: Vec<String>,
    },
    /// OS-level dependency hints emitted instead of acting
    ExternalDeps {
        packages: Vec<String>,
    },

    // Download stage
    DownloadStarting {
        count: usize,
    },
    DownloadCompleted {
        package: PackageId,
    },
    DownloadMissed {
        package: PackageId,
    },

    // Removal stage
    RemovalStarting {
        count: usize,
    },
    RemovalCompleted {
        removed: Vec<PackageId>,
    },

    // Scheduler
    BuildStarting {
        package: PackageId,
    },
    ActionCompleted {
        action: Action,
    },
    ActionFailed {
        action: Action,
        error: String,
    },
    ActionCancelled {
        action: Action,
    },
    /// Emitted once when a user interrupt aborts the scheduler
    Aborting,

    // Post-install messaging
    PostMessage {
        package: PackageId,
        lines: Vec<String>,
        failed: bool,
    },

    // Environment interference check
    EnvWarning {
        variables: Vec<String>,
    },

    // Final report
    Report {
        lines: Vec<String>,
    },

    // Errors and warnings
    Warning {
        message: String,
        context: Option<String>,
    },
    Error {
        message: String,
        details: Option<String>,
    },

    // Debug logging (when --debug enabled)
    DebugLog {
        message: String,
        context: HashMap<String, String>,
    },
}

impl Event {
    /// Create a warning event
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
            context: None,
        }
    }

    /// Create an error event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            details: None,
        }
    }

    /// Create a debug log event
    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
            context: HashMap::new(),
        }
    }
}

/// Helper to send events with error handling
pub trait EventSenderExt {
    /// Send an event, ignoring send errors (receiver dropped)
    fn emit(&self, event: Event);
}

impl EventSenderExt for EventSender {
    fn emit(&self, event: Event) {
        // Ignore send errors - if receiver is dropped, we just continue
        let _ = self.send(event);
    }
}
