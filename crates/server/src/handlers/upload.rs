use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::errors::{INVALID_IMAGE, ServerError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageRequest {
    pub image_data: String,
}

#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub message: &'static str,
}

pub async fn upload_image(
    State(state): State<AppState>,
    payload: Result<Json<UploadImageRequest>, JsonRejection>,
) -> Result<Json<UploadImageResponse>, ServerError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "malformed upload body");
        ServerError::json(StatusCode::BAD_REQUEST, INVALID_IMAGE)
    })?;

    let submission = state.sketches.submit_base64(&payload.image_data).await?;
    tracing::info!(
        path = %submission.path.display(),
        bytes = submission.bytes,
        processed = submission.processing.is_ok(),
        "sketch received"
    );

    Ok(Json(UploadImageResponse {
        message: "Image received and processed",
    }))
}
