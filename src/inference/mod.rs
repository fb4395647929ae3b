//! Inference engine module
//!
//! Provides single-image binary classification with:
//! - One ONNX model loaded at startup (fatal if missing or malformed)
//! - A `Classifier` seam so other runtimes can stand in for the model
//! - Optional mutual exclusion for runtimes that are not reentrant
//! - Latency and call-count tracking

mod classifier;
mod config;
mod engine;

pub use classifier::{ClassScores, Classifier, OnnxClassifier};
pub use config::InferenceConfig;
pub use engine::{InferenceEngine, InferenceStats, Prediction};
