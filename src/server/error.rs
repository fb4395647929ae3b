//! Error types for the server

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::DetectorError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Request body rejected by an extractor, with the extractor's status
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Detector(#[from] DetectorError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            ServerError::Rejected { status, message } => {
                tracing::debug!(status = status.as_u16(), detail = %message, "Request rejected");
                (*status, message.clone())
            }
            ServerError::Detector(e) => match e {
                DetectorError::NoImage => (StatusCode::NOT_FOUND, e.to_string()),
                DetectorError::RemoteUnavailable(_) => {
                    tracing::warn!(detail = %e, "Camera fetch failed");
                    (StatusCode::BAD_GATEWAY, e.to_string())
                }
                DetectorError::DecodeError(_) => {
                    tracing::warn!(detail = %e, "Image could not be processed");
                    (StatusCode::INTERNAL_SERVER_ERROR, format!("Model processing error: {}", e))
                }
                DetectorError::InferenceError(_) | DetectorError::ShapeError { .. } => {
                    tracing::error!(detail = %e, "Inference failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, format!("Prediction failed: {}", e))
                }
                DetectorError::StartupFailure(_) | DetectorError::IoError(_) => {
                    tracing::error!(detail = %e, "Unexpected server failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
            },
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for ServerError {
    fn from(rejection: MultipartRejection) -> Self {
        ServerError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// A multipart stream that cannot be read is a server-side read failure,
/// except when it exceeds the body limit
impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::Rejected {
                status: err.status(),
                message: err.body_text(),
            }
        } else {
            ServerError::Internal(format!("failed to read upload: {}", err.body_text()))
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<ServerError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(DetectorError::NoImage), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(DetectorError::RemoteUnavailable("timed out".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(DetectorError::DecodeError("bad".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(DetectorError::InferenceError("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ServerError::BadRequest("no file".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct Payload {
        image: String,
    }

    #[test]
    fn test_json_rejection_keeps_status_and_renders_json() {
        let rejection = Json::<Payload>::from_bytes(br#"{"img":"x"}"#).unwrap_err();
        let response = ServerError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );

        let rejection = Json::<Payload>::from_bytes(b"not json").unwrap_err();
        assert_eq!(status_of(rejection), StatusCode::BAD_REQUEST);
    }
}
