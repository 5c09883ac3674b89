//! Process execution adapter
//!
//! Runs command strings produced by the command builder and applies the
//! stderr policy: anything other than the media tool's version banner on
//! stderr is a failure.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::ports::*;

/// Stderr prefixes that are informational rather than errors
pub const BENIGN_BANNERS: &[&str] = &["ffmpeg version", "ffprobe version"];

/// Whether stderr output can be ignored
pub fn is_benign_stderr(stderr: &str) -> bool {
    let trimmed = stderr.trim_start();
    trimmed.is_empty() || BENIGN_BANNERS.iter().any(|banner| trimmed.starts_with(banner))
}

/// Runs commands as child processes
#[derive(Debug, Clone, Default)]
pub struct ShellProcessAdapter {
    timeout: Option<Duration>,
}

impl ShellProcessAdapter {
    /// Create adapter without a timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ProcessPort for ShellProcessAdapter {
    async fn run(&self, command: &str) -> Result<CommandOutput, DomainError> {
        let words = shell_words::split(command).map_err(|e| {
            DomainError::Validation(format!("Malformed command '{}': {}", command, e))
        })?;
        let (program, args) = words
            .split_first()
            .ok_or_else(|| DomainError::Validation("Empty command".to_string()))?;

        debug!(command, "Running external command");
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let child = cmd.output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child).await.map_err(|_| {
                DomainError::Execution(format!(
                    "Command timed out after {}s: {}",
                    limit.as_secs_f64(),
                    command
                ))
            })?,
            None => child.await,
        }
        .map_err(|e| DomainError::Execution(format!("Failed to run '{}': {}", program, e)))?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            warn!(command, status = %output.status, "External command failed");
            return Err(DomainError::Execution(format!(
                "'{}' exited with {}: {}",
                program,
                output.status,
                result.stderr.trim()
            )));
        }
        if !is_benign_stderr(&result.stderr) {
            warn!(command, "External command wrote to stderr");
            return Err(DomainError::Execution(result.stderr.trim().to_string()));
        }

        Ok(result)
    }
}
