//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};
use base64::Engine as _;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::DetectorError;
use crate::inference::Prediction;
use crate::remote::ProbeReport;

use super::error::{Result, ServerError};
use super::state::AppState;

/// JSON body carrying a base64-encoded image
#[derive(Debug, Deserialize)]
pub struct ImageData {
    image: String,
}

/// Decode a base64 image payload, tolerating a `data:...;base64,` prefix and line breaks
fn decode_base64_image(payload: &str) -> std::result::Result<Vec<u8>, DetectorError> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
}

/// Run CPU-bound detector work off the async runtime
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServerError::Internal(format!("prediction task failed: {}", e)))?;
    Ok(result?)
}

// ============================================================================
// Camera Handlers
// ============================================================================

/// Fetch an image from the camera, classify it and keep both as the latest session data
pub async fn analyze_live(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let image = state.camera.capture().await?;

    let engine = Arc::clone(&state.engine);
    let input = image.clone();
    let prediction = run_blocking(move || engine.predict(&input)).await?;

    state.session.store_with_prediction(image.clone(), prediction.clone());
    info!(
        size_bytes = image.len(),
        is_cat = prediction.is_cat,
        confidence = prediction.confidence,
        "Live prediction"
    );

    Ok(Json(json!({
        "status": "success",
        "source": state.camera.url(),
        "size_bytes": image.len(),
        "prediction": prediction,
    })))
}

/// Fetch an image from the camera and store it without predicting
pub async fn capture_and_store(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let image = state.camera.capture().await?;
    let stored = state.session.store_image(image);
    info!(size_bytes = stored.size_bytes, "Image captured and stored");

    Ok(Json(json!({
        "status": "success",
        "message": "Image captured and stored",
        "source": state.camera.url(),
        "size_bytes": stored.size_bytes,
        "timestamp": stored.timestamp,
    })))
}

// ============================================================================
// Upload Handlers
// ============================================================================

/// Receive an image as the `file` part of a multipart form
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if !is_file {
            continue;
        }

        let data = field.bytes().await?;
        let stored = state.session.store_image(data);
        info!(size_bytes = stored.size_bytes, timestamp = %stored.timestamp, "Image uploaded");

        return Ok(Json(json!({
            "status": "success",
            "message": "Image uploaded successfully",
            "size_bytes": stored.size_bytes,
            "timestamp": stored.timestamp,
        })));
    }

    Err(ServerError::BadRequest("No file uploaded".to_string()))
}

/// Receive a base64-encoded image as `{"image": "..."}`
pub async fn upload_image_base64(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ImageData>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(data) = payload?;
    let image = decode_base64_image(&data.image)?;
    let stored = state.session.store_image(Bytes::from(image));
    info!(size_bytes = stored.size_bytes, "Base64 image uploaded");

    Ok(Json(json!({
        "status": "success",
        "message": "Image uploaded successfully",
        "size_bytes": stored.size_bytes,
        "timestamp": stored.timestamp,
    })))
}

// ============================================================================
// Prediction Handlers
// ============================================================================

/// Prediction for the latest stored image, cached until the next upload
pub async fn get_prediction(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Prediction>> {
    let shared = Arc::clone(&state);
    let prediction = run_blocking(move || shared.session.get_or_predict(&shared.engine)).await?;
    Ok(Json(prediction))
}

/// Classify a base64 image immediately, leaving the session untouched
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ImageData>, JsonRejection>,
) -> Result<Json<Prediction>> {
    let Json(data) = payload?;
    let image = decode_base64_image(&data.image)?;
    let engine = Arc::clone(&state.engine);
    let prediction = run_blocking(move || engine.predict(&image)).await?;
    info!(is_cat = prediction.is_cat, confidence = prediction.confidence, "Direct prediction");
    Ok(Json(prediction))
}

// ============================================================================
// Status & Info Handlers
// ============================================================================

pub async fn root(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "API is running",
        "name": "Cat Detector API",
        "version": env!("CARGO_PKG_VERSION"),
        "esp32_url": state.camera.url(),
        "endpoints": {
            "live_analysis": "GET /analyze-live (fetch from camera + predict immediately)",
            "capture_store": "POST /capture-and-store (fetch from camera + store only)",
            "upload_multipart": "POST /upload-image (multipart/form-data)",
            "upload_base64": "POST /upload-image-base64 (JSON with base64)",
            "get_prediction": "GET /get-prediction (predict from stored image)",
            "direct_predict": "POST /predict (base64 -> immediate result)",
            "status": "GET /status (check system status)",
            "test_camera": "GET /test-esp32 (check camera connectivity)",
        },
    }))
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let snapshot = state.session.snapshot();
    let (hits, misses, hit_rate) = state.session.stats();

    Json(json!({
        "image_uploaded": snapshot.image_uploaded,
        "image_size_bytes": snapshot.image_size_bytes,
        "timestamp": snapshot.timestamp,
        "prediction_cached": snapshot.prediction_cached,
        "esp32_configured": state.camera.is_configured(),
        "esp32_url": state.camera.url(),
        "model_loaded": true,
        "inference": state.engine.stats(),
        "cache": {
            "hits": hits,
            "misses": misses,
            "hit_rate": hit_rate,
        },
    }))
}

/// Camera connectivity check; always answers 200
pub async fn test_esp32(State(state): State<Arc<AppState>>) -> Json<ProbeReport> {
    Json(state.camera.probe().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_base64() {
        assert_eq!(decode_base64_image("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_data_url_and_line_breaks() {
        let payload = "data:image/png;base64,aGVs\r\nbG8=";
        assert_eq!(decode_base64_image(payload).unwrap(), b"hello");
    }

    #[test]
    fn test_decode_malformed_base64() {
        let err = decode_base64_image("%%%not-base64%%%").unwrap_err();
        assert!(matches!(err, DetectorError::DecodeError(_)));
    }
}
