//! Cat Detector - image classification behind a small HTTP API
//!
//! This crate accepts an image (multipart upload, base64 payload, or a pull
//! from a remote camera), runs a fixed-shape ONNX classifier over it and
//! reports whether it shows a cat.
//!
//! # Modules
//!
//! - [`preprocessing`] - Image bytes to normalized 1x224x224x3 tensor
//! - [`inference`] - Model loading, classification and prediction records
//! - [`cache`] - Latest image and its cached prediction
//! - [`remote`] - Camera image fetching
//! - [`monitoring`] - Latency and call-count metrics
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

pub mod error;

pub mod preprocessing;
pub mod inference;
pub mod cache;
pub mod remote;
pub mod monitoring;

pub mod server;
pub mod cli;

pub use error::{DetectorError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{DetectorError, Result};
    pub use crate::preprocessing::{decode, ImageDecoder, ImageTensor};
    pub use crate::inference::{ClassScores, Classifier, InferenceConfig, InferenceEngine, OnnxClassifier, Prediction};
    pub use crate::cache::{SessionCache, SessionSnapshot, StoredImage};
    pub use crate::remote::{fetch_image, CameraClient, ProbeReport};
    pub use crate::server::{create_router, run_server, AppState, ServerConfig};
}
