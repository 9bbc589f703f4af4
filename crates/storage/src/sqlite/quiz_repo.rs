use quiz_core::model::{QuestionCount, QuestionId, QuizQuestion, Stage};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{map_question_row, question_id_from_i64};
use crate::repository::{NewQuestionRecord, QuizRepository, StorageError};

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn random_questions(
        &self,
        stage: Stage,
        count: QuestionCount,
    ) -> Result<Vec<QuizQuestion>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT * FROM quiz
            WHERE stage = ?1
            ORDER BY RANDOM()
            LIMIT ?2
            ",
        )
        .bind(stage.value())
        .bind(i64::from(count.value()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }

    async fn insert_question(&self, record: NewQuestionRecord) -> Result<QuestionId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO quiz (stage, question, options, answer)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(record.stage.value())
        .bind(record.question)
        .bind(record.options)
        .bind(record.answer)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        question_id_from_i64(res.last_insert_rowid())
    }

    async fn count_for_stage(&self, stage: Stage) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM quiz WHERE stage = ?1")
            .bind(stage.value())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        u64::try_from(n).map_err(|_| StorageError::Serialization(format!("invalid count: {n}")))
    }
}
