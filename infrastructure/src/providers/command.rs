//! External command provider
//!
//! Runs a local program per call, writes the prompt to its stdin and takes
//! its trimmed stdout as the response. The child is spawned with
//! `kill_on_drop`, so abandoning the call (deadline, cancellation) kills it.

use async_trait::async_trait;
use concord_application::ports::provider::{CompletionProvider, ProviderError};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::debug;

/// Maximum stderr excerpt carried in an error reason
const MAX_STDERR_CHARS: usize = 500;

/// Provider backed by a local command line tool
#[derive(Debug, Clone)]
pub struct CommandProvider {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandProvider {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Resolve `command` on `PATH` (or as a path) before building the provider
    pub fn resolve(command: &str, args: Vec<String>) -> Result<Self, ProviderError> {
        let program = which::which(command).map_err(|e| {
            ProviderError::Unavailable(format!("command '{}' not found: {}", command, e))
        })?;
        Ok(Self::new(program, args))
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    async fn run(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ProviderError::Unavailable(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let stdin = child.stdin.take();
        let write_prompt = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(prompt.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };

        let (written, output) = tokio::join!(write_prompt, child.wait_with_output());

        // A program that ignores stdin closes the pipe early; its output still counts
        if let Err(e) = written {
            debug!("Writing prompt to {} failed: {}", self.program.display(), e);
        }

        let output = output.map_err(|e| ProviderError::Request(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(MAX_STDERR_CHARS).collect();
            return Err(ProviderError::Request(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                excerpt
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "command produced no output".to_string(),
            ));
        }
        Ok(stdout)
    }
}

#[async_trait]
impl CompletionProvider for CommandProvider {
    async fn complete(&self, prompt: &str, deadline: Instant) -> Result<String, ProviderError> {
        tokio::time::timeout_at(deadline, self.run(prompt))
            .await
            .map_err(|_| ProviderError::DeadlineExceeded)?
    }
}
