//! Inference configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the inference engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Path of the ONNX model artifact
    pub model_path: PathBuf,

    /// Number of recent latencies kept for percentile statistics
    pub metrics_window: usize,

    /// Serialize classify calls behind a mutex (for runtimes that are not reentrant)
    pub serialize_inference: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.onnx"),
            metrics_window: 10_000,
            serialize_inference: false,
        }
    }
}

impl InferenceConfig {
    /// Create a new inference configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the model path
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Builder method to set the latency window size
    pub fn with_metrics_window(mut self, size: usize) -> Self {
        self.metrics_window = size;
        self
    }

    /// Builder method to serialize classify calls
    pub fn with_serialized_inference(mut self, serialize: bool) -> Self {
        self.serialize_inference = serialize;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.model_path, PathBuf::from("model.onnx"));
        assert!(!config.serialize_inference);
    }

    #[test]
    fn test_builder_pattern() {
        let config = InferenceConfig::new()
            .with_model_path("/models/cat.onnx")
            .with_metrics_window(50)
            .with_serialized_inference(true);

        assert_eq!(config.model_path, PathBuf::from("/models/cat.onnx"));
        assert_eq!(config.metrics_window, 50);
        assert!(config.serialize_inference);
    }
}
