use std::time::Duration;

/// Result of running the external prediction script on a saved sketch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOutcome {
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
    elapsed: Duration,
}

impl ProcessingOutcome {
    #[must_use]
    pub fn new(exit_code: Option<i32>, stdout: String, stderr: String, elapsed: Duration) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            elapsed,
        }
    }

    /// Outcome for a run that was intentionally skipped.
    #[must_use]
    pub fn skipped() -> Self {
        Self::new(Some(0), String::new(), String::new(), Duration::ZERO)
    }

    /// `None` when the process was terminated by a signal.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
