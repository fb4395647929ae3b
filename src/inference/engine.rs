//! Inference engine implementation
//!
//! Owns the one loaded classifier for the process and turns its raw
//! scores into [`Prediction`] records. Every call is timed and counted.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::Result;
use crate::monitoring::PerformanceMetrics;
use crate::preprocessing::{ImageDecoder, ImageTensor};
use super::classifier::{ClassScores, Classifier, OnnxClassifier};
use super::InferenceConfig;

/// Binary classification result, serialized with the public camelCase keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub is_cat: bool,
    pub confidence: f32,
    pub cat_probability: f32,
    pub not_cat_probability: f32,
    /// RFC 3339 time the prediction was made
    pub timestamp: String,
}

impl Prediction {
    /// Build a prediction from raw scores. A tie is not a cat.
    pub fn from_scores(scores: ClassScores, timestamp: String) -> Self {
        Self {
            is_cat: scores.cat > scores.not_cat,
            confidence: scores.cat.max(scores.not_cat),
            cat_probability: scores.cat,
            not_cat_probability: scores.not_cat,
            timestamp,
        }
    }
}

/// Inference statistics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceStats {
    pub model: String,
    pub total_predictions: u64,
    pub error_count: u64,
    pub error_rate: f64,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub uptime_secs: f64,
}

/// Inference engine holding the process-wide classifier
pub struct InferenceEngine {
    config: InferenceConfig,
    classifier: Arc<dyn Classifier>,
    decoder: ImageDecoder,
    metrics: PerformanceMetrics,
    /// Present when classify calls must not overlap
    exclusive: Option<Mutex<()>>,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("config", &self.config)
            .field("classifier", &self.classifier.describe())
            .field("serialized", &self.exclusive.is_some())
            .finish()
    }
}

impl InferenceEngine {
    /// Create an engine around an already loaded classifier
    pub fn new(config: InferenceConfig, classifier: Arc<dyn Classifier>) -> Self {
        let exclusive = config.serialize_inference.then(|| Mutex::new(()));
        Self {
            metrics: PerformanceMetrics::new(config.metrics_window),
            decoder: ImageDecoder::default(),
            classifier,
            exclusive,
            config,
        }
    }

    /// Load the ONNX model named by `config`. Fails with `StartupFailure`.
    pub fn load(config: InferenceConfig) -> Result<Self> {
        let classifier = OnnxClassifier::load(&config.model_path)?;
        Ok(Self::new(config, Arc::new(classifier)))
    }

    /// Run one forward pass over `tensor`
    pub fn classify(&self, tensor: &ImageTensor) -> Result<ClassScores> {
        let start = Instant::now();

        let result = match &self.exclusive {
            Some(lock) => {
                let _guard = lock.lock();
                self.classifier.classify(tensor)
            }
            None => self.classifier.classify(tensor),
        };

        match &result {
            Ok(scores) => {
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                self.metrics.record_latency(latency_ms);
                debug!(
                    cat = scores.cat,
                    not_cat = scores.not_cat,
                    latency_ms,
                    "Classified image"
                );
            }
            Err(e) => {
                self.metrics.record_error();
                warn!(error = %e, "Classification failed");
            }
        }

        result
    }

    /// Decode and classify `bytes` without touching any session state
    pub fn predict(&self, bytes: &[u8]) -> Result<Prediction> {
        let tensor = self.decoder.decode(bytes)?;
        let scores = self.classify(&tensor)?;
        Ok(Prediction::from_scores(scores, chrono::Utc::now().to_rfc3339()))
    }

    /// Number of classify calls made so far, failed ones included
    pub fn classify_calls(&self) -> u64 {
        self.metrics.total_calls()
    }

    /// Get inference statistics snapshot
    pub fn stats(&self) -> InferenceStats {
        let summary = self.metrics.summary();
        InferenceStats {
            model: self.classifier.describe(),
            total_predictions: summary.total_calls,
            error_count: summary.total_errors,
            error_rate: summary.error_rate,
            avg_latency_ms: summary.avg_latency_ms,
            p50_latency_ms: summary.p50_latency_ms,
            p95_latency_ms: summary.p95_latency_ms,
            p99_latency_ms: summary.p99_latency_ms,
            uptime_secs: summary.uptime_secs,
        }
    }
}
