use axum::Json;
use axum::extract::{RawQuery, State};
use quiz_core::model::{QuizQuestion, QuizRequest, QuizSelection};

use crate::app_state::AppState;
use crate::errors::ServerError;

/// Row arrays of the loaded slots, in slot order.
pub type QuizRows = Vec<Vec<QuizQuestion>>;

async fn select(state: &AppState, query: Option<String>) -> Result<QuizSelection, ServerError> {
    let request = QuizRequest::from_query(query.as_deref().unwrap_or_default());
    let selection = state.quiz.select(&request).await?;
    if selection.skipped_count() > 0 {
        tracing::debug!(skipped = selection.skipped_count(), "quiz request had skipped slots");
    }
    Ok(selection)
}

pub async fn quiz(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<QuizRows>, ServerError> {
    let selection = select(&state, query).await?;
    Ok(Json(selection.compact()))
}

/// Same selection as `/quiz`, reported per slot so positions never shift.
pub async fn quiz_slots(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<QuizSelection>, ServerError> {
    Ok(Json(select(&state, query).await?))
}
