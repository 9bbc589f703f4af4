use std::path::PathBuf;
use std::sync::Arc;

use services::{AppServices, QuizService, SketchService};

#[derive(Clone)]
pub struct AppState {
    pub quiz: Arc<QuizService>,
    pub sketches: Arc<SketchService>,
}

impl AppState {
    #[must_use]
    pub fn new(quiz: Arc<QuizService>, sketches: Arc<SketchService>) -> Self {
        Self { quiz, sketches }
    }

    #[must_use]
    pub fn from_services(services: &AppServices) -> Self {
        Self::new(services.quiz(), services.sketches())
    }
}

/// Router settings that are not part of the shared state.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Directory of the built front-end.
    pub static_dir: PathBuf,
    /// Document served for every path that matches neither a route nor a file.
    pub index_file: String,
    pub body_limit_bytes: usize,
}

impl RouterOptions {
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join(&self.index_file)
    }
}
