use async_trait::async_trait;
use quiz_core::model::{QuestionCount, QuestionId, QuizQuestion, Stage};
use rand::seq::SliceRandom;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("file error at {path}: {message}")]
    File { path: PathBuf, message: String },
}

/// Insert shape for a quiz question (ID assigned by storage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestionRecord {
    pub stage: Stage,
    pub question: String,
    pub options: Option<String>,
    pub answer: Option<String>,
}

impl NewQuestionRecord {
    #[must_use]
    pub fn new(stage: Stage, question: impl Into<String>) -> Self {
        Self {
            stage,
            question: question.into(),
            options: None,
            answer: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    #[must_use]
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    fn into_columns(self, id: QuestionId) -> Map<String, Value> {
        let mut columns = Map::new();
        columns.insert("id".into(), Value::from(id.value()));
        columns.insert("stage".into(), Value::from(self.stage.value()));
        columns.insert("question".into(), Value::from(self.question));
        columns.insert("options".into(), self.options.map_or(Value::Null, Value::from));
        columns.insert("answer".into(), self.answer.map_or(Value::Null, Value::from));
        columns
    }
}

/// Repository contract for the `quiz` table.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Fetch up to `count` distinct questions of `stage`, in random order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be queried or a row cannot
    /// be mapped.
    async fn random_questions(
        &self,
        stage: Stage,
        count: QuestionCount,
    ) -> Result<Vec<QuizQuestion>, StorageError>;

    /// Persist a new question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn insert_question(&self, record: NewQuestionRecord) -> Result<QuestionId, StorageError>;

    /// Number of stored questions for a stage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be queried.
    async fn count_for_stage(&self, stage: Stage) -> Result<u64, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<QuizQuestion>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn random_questions(
        &self,
        stage: Stage,
        count: QuestionCount,
    ) -> Result<Vec<QuizQuestion>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut matching: Vec<&QuizQuestion> =
            guard.iter().filter(|q| q.stage() == stage).collect();

        let amount = usize::try_from(count.value()).unwrap_or(usize::MAX);
        let (picked, _) = matching.partial_shuffle(&mut rand::rng(), amount);
        Ok(picked.iter().map(|q| (*q).clone()).collect())
    }

    async fn insert_question(&self, record: NewQuestionRecord) -> Result<QuestionId, StorageError> {
        let mut guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = QuestionId::new(guard.len() as u64 + 1);
        let question = QuizQuestion::from_columns(record.into_columns(id))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.push(question);
        Ok(id)
    }

    async fn count_for_stage(&self, stage: Stage) -> Result<u64, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().filter(|q| q.stage() == stage).count() as u64)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quiz: Arc<dyn QuizRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let quiz: Arc<dyn QuizRepository> = Arc::new(InMemoryRepository::new());
        Self { quiz }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn seeded() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        for i in 0..6 {
            let stage = Stage::new(if i < 4 { 1 } else { 2 });
            repo.insert_question(NewQuestionRecord::new(stage, format!("Q{i}")).with_answer("A"))
                .await
                .unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn samples_without_replacement_within_stage() {
        let repo = seeded().await;

        let picked = repo
            .random_questions(Stage::new(1), QuestionCount::new(3))
            .await
            .unwrap();
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|q| q.stage() == Stage::new(1)));

        let ids: HashSet<_> = picked
            .iter()
            .filter_map(|q| q.get("id").and_then(Value::as_u64))
            .collect();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn returns_at_most_available_rows() {
        let repo = seeded().await;

        let picked = repo
            .random_questions(Stage::new(2), QuestionCount::new(10))
            .await
            .unwrap();
        assert_eq!(picked.len(), 2);

        let none = repo
            .random_questions(Stage::new(9), QuestionCount::new(10))
            .await
            .unwrap();
        assert!(none.is_empty());

        let zero = repo
            .random_questions(Stage::new(1), QuestionCount::new(0))
            .await
            .unwrap();
        assert!(zero.is_empty());
    }

    #[tokio::test]
    async fn counts_and_assigns_ids() {
        let repo = InMemoryRepository::new();
        let first = repo
            .insert_question(NewQuestionRecord::new(Stage::new(3), "Q"))
            .await
            .unwrap();
        let second = repo
            .insert_question(NewQuestionRecord::new(Stage::new(3), "Q2").with_options("[]"))
            .await
            .unwrap();
        assert_eq!(first, QuestionId::new(1));
        assert_eq!(second, QuestionId::new(2));
        assert_eq!(repo.count_for_stage(Stage::new(3)).await.unwrap(), 2);
        assert_eq!(repo.count_for_stage(Stage::new(4)).await.unwrap(), 0);
    }
}
