//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use quiz_core::model::SketchError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizService`.
///
/// Malformed slots are not errors; they are reported per slot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ImageProcessor` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProcessingError {
    #[error("processor command is empty")]
    EmptyCommand,
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed while waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` did not finish within {after:?}")]
    TimedOut { program: String, after: Duration },
}

/// Errors emitted by `SketchService`.
///
/// Processing failures are not in here: they travel inside
/// `SketchSubmission::processing` because the upload itself succeeded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SketchServiceError {
    #[error(transparent)]
    Image(#[from] SketchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Processor(#[from] ProcessingError),
}
