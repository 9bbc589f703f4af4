#![forbid(unsafe_code)]

pub mod repository;
pub mod sketch_store;
pub mod sqlite;

pub use repository::{InMemoryRepository, NewQuestionRecord, QuizRepository, Storage, StorageError};
pub use sketch_store::{FsSketchStore, SketchStore};
pub use sqlite::{PoolSettings, SqliteInitError, SqliteRepository};
