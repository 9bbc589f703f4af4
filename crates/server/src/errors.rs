use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use services::{QuizServiceError, SketchServiceError};

pub(crate) const INVALID_IMAGE: &str = "Invalid image data";
pub(crate) const SAVE_FAILED: &str = "Error saving image";
pub(crate) const QUERY_FAILED: &str = "Error querying database";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Body {
    Json,
    PlainText,
}

/// Error response; the body is either `{"error": message}` or the bare message.
#[derive(Debug)]
pub struct ServerError {
    status: StatusCode,
    message: String,
    body: Body,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a str,
}

impl ServerError {
    pub fn json(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body: Body::Json,
        }
    }

    pub fn plain(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body: Body::PlainText,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self.body {
            Body::Json => (
                self.status,
                axum::Json(ErrorEnvelope {
                    error: &self.message,
                }),
            )
                .into_response(),
            Body::PlainText => (self.status, self.message).into_response(),
        }
    }
}

impl From<QuizServiceError> for ServerError {
    fn from(err: QuizServiceError) -> Self {
        tracing::error!(error = %err, "quiz query failed");
        Self::plain(StatusCode::INTERNAL_SERVER_ERROR, QUERY_FAILED)
    }
}

impl From<SketchServiceError> for ServerError {
    fn from(err: SketchServiceError) -> Self {
        match err {
            SketchServiceError::Image(err) => {
                tracing::warn!(error = %err, "rejected sketch upload");
                Self::json(StatusCode::BAD_REQUEST, INVALID_IMAGE)
            }
            other => {
                tracing::error!(error = %other, "failed to save sketch");
                Self::json(StatusCode::INTERNAL_SERVER_ERROR, SAVE_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::SketchError;

    #[test]
    fn image_errors_are_bad_requests() {
        let err = ServerError::from(SketchServiceError::Image(SketchError::Empty));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), INVALID_IMAGE);
    }

    #[test]
    fn write_failures_are_server_errors() {
        let err = ServerError::from(SketchServiceError::Storage(storage::StorageError::File {
            path: "sketch_images/sketch.png".into(),
            message: "permission denied".into(),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), SAVE_FAILED);
    }

    #[test]
    fn plain_errors_have_text_bodies() {
        let response = ServerError::plain(StatusCode::INTERNAL_SERVER_ERROR, QUERY_FAILED)
            .into_response();
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("text/plain"));
    }
}
