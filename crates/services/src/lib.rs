#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod processor;
pub mod quiz_service;
pub mod sketch_service;

pub use app_services::{AppServices, ServicesConfig};
pub use error::{AppServicesError, ProcessingError, QuizServiceError, SketchServiceError};
pub use processor::{ImageProcessor, NoopProcessor, ScriptProcessor};
pub use quiz_service::{DEFAULT_MAX_COUNT, QuizService};
pub use sketch_service::{SketchService, SketchSubmission};
