//! Subprocess failure carried as a value
//!
//! Build and removal steps run external processes; a non-zero exit is
//! captured here with enough context for the structured report and the
//! audit log (exit code, wall-clock duration, environment summary and
//! captured output).

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("command exited with {}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
pub struct ProcessError {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
    /// Wall-clock duration in seconds
    pub duration_secs: f64,
    /// Key/value context (command, working directory, relevant env)
    pub info: BTreeMap<String, String>,
    /// Captured standard output, one entry per line
    pub stdout: Vec<String>,
    /// Captured standard error, one entry per line
    pub stderr: Vec<String>,
}

impl ProcessError {
    /// Create a process error from an exit code
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            duration_secs: 0.0,
            info: BTreeMap::new(),
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Attach a context entry
    #[must_use]
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info.insert(key.into(), value.into());
        self
    }

    /// Attach captured stderr lines
    #[must_use]
    pub fn with_stderr(mut self, lines: Vec<String>) -> Self {
        self.stderr = lines;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = ProcessError::from_code(2).with_duration(0.5);
        assert_eq!(err.to_string(), "command exited with 2");
    }

    #[test]
    fn test_signal_display() {
        let err = ProcessError {
            code: None,
            duration_secs: 0.0,
            info: BTreeMap::new(),
            stdout: Vec::new(),
            stderr: Vec::new(),
        };
        assert_eq!(err.to_string(), "command exited with signal");
    }
}
