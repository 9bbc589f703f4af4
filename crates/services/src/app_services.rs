use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::QuestionCount;
use storage::repository::Storage;
use storage::sketch_store::{FsSketchStore, SketchStore};
use storage::sqlite::PoolSettings;

use crate::error::AppServicesError;
use crate::processor::{ImageProcessor, NoopProcessor, ScriptProcessor};
use crate::quiz_service::QuizService;
use crate::sketch_service::SketchService;

/// Everything needed to assemble the services.
#[derive(Debug, Clone)]
pub struct ServicesConfig {
    pub database_url: String,
    pub pool: PoolSettings,
    pub max_quiz_count: QuestionCount,
    pub sketch_path: PathBuf,
    /// Program and leading arguments; the sketch path is appended. Empty
    /// disables processing.
    pub processor_command: Vec<String>,
    pub processor_timeout: Option<Duration>,
}

/// Assembles the services the HTTP layer depends on.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    sketches: Arc<SketchService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// processor command is unusable.
    pub async fn new_sqlite(config: &ServicesConfig) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.database_url, config.pool).await?;
        let store: Arc<dyn SketchStore> = Arc::new(FsSketchStore::new(&config.sketch_path));
        let processor = build_processor(config)?;
        Ok(Self::from_parts(
            storage,
            store,
            processor,
            config.max_quiz_count,
        ))
    }

    #[must_use]
    pub fn from_parts(
        storage: Storage,
        store: Arc<dyn SketchStore>,
        processor: Arc<dyn ImageProcessor>,
        max_quiz_count: QuestionCount,
    ) -> Self {
        Self {
            quiz: Arc::new(QuizService::new(storage.quiz, max_quiz_count)),
            sketches: Arc::new(SketchService::new(store, processor)),
        }
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn sketches(&self) -> Arc<SketchService> {
        Arc::clone(&self.sketches)
    }
}

fn build_processor(config: &ServicesConfig) -> Result<Arc<dyn ImageProcessor>, AppServicesError> {
    if config.processor_command.is_empty() {
        tracing::warn!("no prediction command configured; uploads will only be saved");
        return Ok(Arc::new(NoopProcessor));
    }
    let processor =
        ScriptProcessor::from_command(&config.processor_command, config.processor_timeout)?;
    tracing::info!(
        program = processor.program(),
        timeout = ?config.processor_timeout,
        "prediction command configured"
    );
    Ok(Arc::new(processor))
}
