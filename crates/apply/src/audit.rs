//! Audit log of planned actions and failures
//!
//! JSON-lines sink shared by every apply. Two record kinds: one
//! solution record per apply describing the plan, and one error record
//! per failed action.

use garnet_errors::Error;
use garnet_types::{Action, ActionKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Append-only JSON sink
#[derive(Debug, Clone)]
pub struct AuditSink {
    path: PathBuf,
}

/// One entry of a solution record
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum SolutionEntry {
    Install(String),
    Upgrade([String; 2]),
    Downgrade([String; 2]),
    Recompile(String),
    Delete(String),
}

/// One error record, `{"package": ..., "error": ...}`
#[derive(Debug, Serialize)]
struct ErrorRecord {
    package: String,
    error: ErrorEntry,
}

#[derive(Debug, Serialize)]
enum ErrorEntry {
    #[serde(rename = "process-error")]
    Process(ProcessRecord),
    #[serde(rename = "internal-error")]
    Internal(String),
    #[serde(rename = "package-error")]
    Package(String),
    #[serde(rename = "exception")]
    Exception(String),
}

#[derive(Debug, Serialize)]
struct ProcessRecord {
    code: String,
    duration: f64,
    info: BTreeMap<String, String>,
    stdout: Vec<String>,
    stderr: Vec<String>,
}

fn solution_entry(action: &Action) -> SolutionEntry {
    let target = action.package().to_string();
    match action.kind() {
        ActionKind::Install => SolutionEntry::Install(target),
        ActionKind::Upgrade => {
            let prev = action.previous().map(ToString::to_string).unwrap_or_default();
            SolutionEntry::Upgrade([prev, target])
        }
        ActionKind::Downgrade => {
            let prev = action.previous().map(ToString::to_string).unwrap_or_default();
            SolutionEntry::Downgrade([prev, target])
        }
        ActionKind::Recompile => SolutionEntry::Recompile(target),
        ActionKind::Remove => SolutionEntry::Delete(target),
    }
}

fn error_entry(error: &Error) -> ErrorEntry {
    match error {
        Error::Process(p) => ErrorEntry::Process(ProcessRecord {
            code: p
                .code
                .map_or_else(|| "signal".to_string(), |c| c.to_string()),
            duration: p.duration_secs,
            info: p.info.clone(),
            stdout: p.stdout.clone(),
            stderr: p.stderr.clone(),
        }),
        Error::Internal(message) => ErrorEntry::Internal(message.clone()),
        Error::Package(p) => ErrorEntry::Package(p.to_string()),
        other => ErrorEntry::Exception(other.to_string()),
    }
}

impl AuditSink {
    /// Create a sink appending to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, value: &impl Serialize) -> Result<(), Error> {
        let mut line = serde_json::to_string(value)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Append the solution record for a plan
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the file append fails.
    pub async fn solution(&self, actions: &[Action]) -> Result<(), Error> {
        let entries: Vec<SolutionEntry> = actions.iter().map(solution_entry).collect();
        self.append(&entries).await
    }

    /// Append one error record for a failed action
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the file append fails.
    pub async fn action_error(&self, action: &Action, error: &Error) -> Result<(), Error> {
        let record = ErrorRecord {
            package: action.package().to_string(),
            error: error_entry(error),
        };
        self.append(&record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garnet_errors::ProcessError;
    use garnet_types::{PackageId, Version};

    fn pkg(name: &str, version: &str) -> PackageId {
        PackageId::new(name, Version::parse(version).unwrap())
    }

    #[tokio::test]
    async fn test_solution_record_shape() {
        let temp = tempfile::tempdir().unwrap();
        let sink = AuditSink::new(temp.path().join("audit.json"));

        let actions = vec![
            Action::install(pkg("a", "1.0.0")),
            Action::Change {
                previous: Some(pkg("b", "1.0.0")),
                target: pkg("b", "2.0.0"),
            },
            Action::Delete(pkg("c", "1.0.0")),
        ];
        sink.solution(&actions).await.unwrap();

        let contents = tokio::fs::read_to_string(sink.path()).await.unwrap();
        let record: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();

        assert_eq!(record[0]["install"], "a-1.0.0");
        assert_eq!(record[1]["upgrade"][0], "b-1.0.0");
        assert_eq!(record[1]["upgrade"][1], "b-2.0.0");
        assert_eq!(record[2]["delete"], "c-1.0.0");
    }

    #[tokio::test]
    async fn test_process_error_record_shape() {
        let temp = tempfile::tempdir().unwrap();
        let sink = AuditSink::new(temp.path().join("audit.json"));

        let error = Error::Process(
            ProcessError::from_code(2)
                .with_duration(1.5)
                .with_stderr(vec!["make: *** error".to_string()]),
        );
        sink.action_error(&Action::install(pkg("b", "1.0.0")), &error)
            .await
            .unwrap();

        let contents = tokio::fs::read_to_string(sink.path()).await.unwrap();
        let record: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();

        assert_eq!(record["package"], "b-1.0.0");
        assert_eq!(record["error"]["process-error"]["code"], "2");
        assert_eq!(record["error"]["process-error"]["stderr"][0], "make: *** error");
    }

    #[tokio::test]
    async fn test_exception_fallback() {
        let temp = tempfile::tempdir().unwrap();
        let sink = AuditSink::new(temp.path().join("audit.json"));

        sink.action_error(
            &Action::install(pkg("a", "1.0.0")),
            &Error::unclassified("surprise"),
        )
        .await
        .unwrap();

        let contents = tokio::fs::read_to_string(sink.path()).await.unwrap();
        let record: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(record["error"]["exception"], "surprise");
    }
}
