//! API route definitions

use std::sync::Arc;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::{handlers, state::AppState, ServerConfig};

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Not found. Visit / for the list of endpoints.",
        })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": true,
            "message": "Method not allowed. Visit / for the supported methods.",
        })),
    )
}

/// CORS policy from `CORS_ORIGIN`; any origin when unset or `*`
fn cors_layer() -> CorsLayer {
    match std::env::var("CORS_ORIGIN") {
        Ok(origin) if !origin.is_empty() && origin != "*" => match origin.parse::<HeaderValue>() {
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods(Any)
                .allow_headers(Any),
            Err(_) => {
                warn!(origin = %origin, "Invalid CORS_ORIGIN, allowing any origin");
                CorsLayer::permissive()
            }
        },
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let base64_limit = DefaultBodyLimit::max(config.max_json_body_size());

    Router::new()
        // Camera
        .route("/analyze-live", get(handlers::analyze_live))
        .route("/capture-and-store", post(handlers::capture_and_store))
        // Uploads
        .route("/upload-image", post(handlers::upload_image))
        .route(
            "/upload-image-base64",
            post(handlers::upload_image_base64).layer(base64_limit.clone()),
        )
        // Predictions
        .route("/get-prediction", get(handlers::get_prediction))
        .route("/predict", post(handlers::predict).layer(base64_limit))
        // Status & info
        .route("/", get(handlers::root))
        .route("/status", get(handlers::status))
        .route("/test-esp32", get(handlers::test_esp32))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .layer(CompressionLayer::new())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
