//! Append-only JSON Lines sink for execution events

use chrono::{SecondsFormat, Utc};
use concord_application::ports::execution_logger::{ExecutionEvent, ExecutionLogger};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// A line in the log: the event plus when it was recorded
#[derive(Serialize)]
struct Record<'a> {
    timestamp: String,
    #[serde(flatten)]
    event: &'a ExecutionEvent,
}

/// Writes each [`ExecutionEvent`] as one JSON object per line.
///
/// Several runs may share a file; records are only ever appended. Each
/// line reaches the file as soon as it is complete.
pub struct JsonlExecutionLogger {
    path: PathBuf,
    file: Mutex<LineWriter<File>>,
}

impl JsonlExecutionLogger {
    /// Open `path` for appending, creating it and its directories if missing
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(LineWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, event: &ExecutionEvent) -> io::Result<()> {
        let record = Record {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        };
        let line = serde_json::to_string(&record)?;

        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("execution log writer poisoned"))?;
        writeln!(file, "{}", line)
    }
}

impl ExecutionLogger for JsonlExecutionLogger {
    fn log(&self, event: &ExecutionEvent) {
        if let Err(e) = self.write(event) {
            warn!(
                "Dropped {} event for {}: {}",
                event.kind(),
                self.path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_domain::{OutcomeStatus, ProviderOutcome};
    use serde_json::Value;
    use std::time::Duration;

    fn records(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn timeout_of(provider: &str) -> ExecutionEvent {
        ExecutionEvent::outcome(&ProviderOutcome::new(
            provider,
            "m",
            OutcomeStatus::Timeout,
            Duration::from_secs(2),
        ))
    }

    #[test]
    fn test_events_become_tagged_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("execution.jsonl");
        let logger = JsonlExecutionLogger::open(&path).unwrap();

        logger.log(&timeout_of("claude"));
        logger.log(&ExecutionEvent::ExecutionFailed {
            error: "No provider returned a successful response (1 dispatched)".to_string(),
            outcomes: 1,
        });

        // Lines are on disk before the logger is dropped
        let lines = records(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "provider_outcome");
        assert_eq!(lines[0]["provider"], "claude");
        assert_eq!(lines[0]["status"], "timeout");
        assert_eq!(lines[0]["latency_ms"], 2000);
        assert_eq!(lines[1]["type"], "execution_failed");
        assert_eq!(lines[1]["outcomes"], 1);
        assert!(lines.iter().all(|l| l["timestamp"].as_str().is_some_and(|t| t.ends_with('Z'))));
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("execution.jsonl");

        for provider in ["a", "b"] {
            JsonlExecutionLogger::open(&path)
                .unwrap()
                .log(&timeout_of(provider));
        }

        let lines = records(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["provider"], "b");
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        assert!(JsonlExecutionLogger::open(blocker.join("execution.jsonl")).is_err());
    }
}
