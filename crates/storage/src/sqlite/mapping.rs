use quiz_core::model::{QuestionId, QuizQuestion};
use serde_json::{Map, Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    u64::try_from(v)
        .map(QuestionId::new)
        .map_err(|_| StorageError::Serialization("question_id sign overflow".into()))
}

/// Maps a `quiz` row of any shape, keeping every column.
pub(crate) fn map_question_row(row: &SqliteRow) -> Result<QuizQuestion, StorageError> {
    let mut columns = Map::new();
    for column in row.columns() {
        let value = column_value(row, column.ordinal())?;
        columns.insert(column.name().to_owned(), value);
    }
    QuizQuestion::from_columns(columns).map_err(ser)
}

// SQLite is dynamically typed; dispatch on the storage class of the value,
// not the declared column type.
fn column_value(row: &SqliteRow, index: usize) -> Result<Value, StorageError> {
    let raw = row.try_get_raw(index).map_err(ser)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw.type_info().name().to_owned();

    match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => {
            let v: i64 = row.try_get_unchecked(index).map_err(ser)?;
            Ok(Value::from(v))
        }
        "REAL" | "NUMERIC" => {
            let v: f64 = row.try_get_unchecked(index).map_err(ser)?;
            Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
        }
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get_unchecked(index).map_err(ser)?;
            Ok(match String::from_utf8(bytes) {
                Ok(text) => Value::String(text),
                Err(e) => Value::from(e.into_bytes()),
            })
        }
        _ => {
            let v: String = row.try_get_unchecked(index).map_err(ser)?;
            Ok(Value::String(v))
        }
    }
}
