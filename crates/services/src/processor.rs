use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use quiz_core::model::ProcessingOutcome;
use tokio::process::Command;

use crate::error::ProcessingError;

/// Runs whatever turns a saved sketch into a prediction.
#[async_trait]
pub trait ImageProcessor: Send + Sync {
    /// Process the image stored at `path`.
    ///
    /// A non-zero exit is an `Ok` outcome; errors mean the processor could
    /// not be run or awaited at all.
    ///
    /// # Errors
    ///
    /// Returns `ProcessingError` when the processor cannot be started, awaited,
    /// or exceeds its time limit.
    async fn process(&self, path: &Path) -> Result<ProcessingOutcome, ProcessingError>;
}

/// Invokes an external program with the image path as its last argument,
/// e.g. `python predict.py <path>`.
#[derive(Debug, Clone)]
pub struct ScriptProcessor {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ScriptProcessor {
    /// Build from a full command line (`["python", "predict.py"]`).
    ///
    /// # Errors
    ///
    /// Returns `ProcessingError::EmptyCommand` if `command` has no program.
    pub fn from_command(
        command: &[String],
        timeout: Option<Duration>,
    ) -> Result<Self, ProcessingError> {
        let (program, args) = command.split_first().ok_or(ProcessingError::EmptyCommand)?;
        if program.trim().is_empty() {
            return Err(ProcessingError::EmptyCommand);
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn spawn(&self, path: &Path) -> Result<tokio::process::Child, ProcessingError> {
        Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessingError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

fn log_stream(program: &str, stream: &'static str, text: &str) {
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        if stream == "stderr" {
            tracing::warn!(program, stream, "{line}");
        } else {
            tracing::info!(program, stream, "{line}");
        }
    }
}

#[async_trait]
impl ImageProcessor for ScriptProcessor {
    async fn process(&self, path: &Path) -> Result<ProcessingOutcome, ProcessingError> {
        let started = Instant::now();
        let child = self.spawn(path)?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ProcessingError::TimedOut {
                    program: self.program.clone(),
                    after: limit,
                })?,
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| ProcessingError::Wait {
            program: self.program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        log_stream(&self.program, "stdout", &stdout);
        log_stream(&self.program, "stderr", &stderr);

        let outcome =
            ProcessingOutcome::new(output.status.code(), stdout, stderr, started.elapsed());
        tracing::info!(
            program = %self.program,
            path = %path.display(),
            exit_code = ?outcome.exit_code(),
            elapsed_ms = outcome.elapsed().as_millis() as u64,
            "prediction script exited"
        );
        Ok(outcome)
    }
}

/// Used when no prediction command is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProcessor;

#[async_trait]
impl ImageProcessor for NoopProcessor {
    async fn process(&self, path: &Path) -> Result<ProcessingOutcome, ProcessingError> {
        tracing::debug!(path = %path.display(), "no prediction command configured; skipping");
        Ok(ProcessingOutcome::skipped())
    }
}
