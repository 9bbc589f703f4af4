mod health;
mod quiz;
mod upload;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::app_state::{AppState, RouterOptions};

pub use quiz::QuizRows;
pub use upload::{UploadImageRequest, UploadImageResponse};

pub fn router(state: AppState, options: &RouterOptions) -> Router {
    let static_files =
        ServeDir::new(&options.static_dir).fallback(ServeFile::new(options.index_path()));

    Router::new()
        .route("/health", get(health::health))
        // GET on the upload path serves the front-end like any other page.
        .route(
            "/uploadImage",
            post(upload::upload_image).fallback_service(static_files.clone()),
        )
        .route("/quiz", get(quiz::quiz))
        .route("/quiz/slots", get(quiz::quiz_slots))
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(options.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
