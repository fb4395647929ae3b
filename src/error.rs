//! Error types for the cat detector

use thiserror::Error;

/// Result type alias for detector operations
pub type Result<T> = std::result::Result<T, DetectorError>;

/// Main error type for decoding, inference, caching and camera access
#[derive(Error, Debug)]
pub enum DetectorError {
    /// The model artifact is missing or malformed. The server cannot start.
    #[error("Startup failure: {0}")]
    StartupFailure(String),

    #[error("Remote camera unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Image decode error: {0}")]
    DecodeError(String),

    #[error("No image available. Upload an image first using /upload-image or /capture-and-store")]
    NoImage,

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<image::ImageError> for DetectorError {
    fn from(err: image::ImageError) -> Self {
        DetectorError::DecodeError(err.to_string())
    }
}

impl From<base64::DecodeError> for DetectorError {
    fn from(err: base64::DecodeError) -> Self {
        DetectorError::DecodeError(format!("invalid base64 payload: {}", err))
    }
}

impl From<reqwest::Error> for DetectorError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            "timed out"
        } else if err.is_connect() {
            "connection failed"
        } else {
            "request failed"
        };
        DetectorError::RemoteUnavailable(format!("{}: {}", kind, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DetectorError::DecodeError("truncated".to_string());
        assert_eq!(err.to_string(), "Image decode error: truncated");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "model.onnx");
        let err: DetectorError = io_err.into();
        assert!(matches!(err, DetectorError::IoError(_)));
    }

    #[test]
    fn test_error_from_base64() {
        use base64::Engine;
        let err: DetectorError = base64::engine::general_purpose::STANDARD
            .decode("not base64 !!")
            .unwrap_err()
            .into();
        assert!(matches!(err, DetectorError::DecodeError(_)));
    }
}
