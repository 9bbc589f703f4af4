use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::ids::Stage;

/// Name of the only column the server interprets.
pub const STAGE_COLUMN: &str = "stage";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("quiz row has no `stage` column")]
    MissingStage,

    #[error("quiz row has a non-integer stage: {0}")]
    InvalidStage(String),
}

/// One row of the `quiz` table.
///
/// Columns other than `stage` are carried through untouched, so the
/// front-end sees exactly what the table holds.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    stage: Stage,
    columns: Map<String, Value>,
}

impl QuizQuestion {
    /// Build a question from a column map.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when `stage` is missing or not an integer.
    pub fn from_columns(columns: Map<String, Value>) -> Result<Self, QuestionError> {
        let stage = match columns.get(STAGE_COLUMN) {
            None => return Err(QuestionError::MissingStage),
            Some(value) => value
                .as_i64()
                .map(Stage::new)
                .ok_or_else(|| QuestionError::InvalidStage(value.to_string()))?,
        };
        Ok(Self { stage, columns })
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn columns(&self) -> &Map<String, Value> {
        &self.columns
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    #[must_use]
    pub fn into_columns(self) -> Map<String, Value> {
        self.columns
    }
}

impl Serialize for QuizQuestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.columns.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QuizQuestion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let columns = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_columns(columns).map_err(D::Error::custom)
    }
}
