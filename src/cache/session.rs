//! Latest-image session cache
//!
//! Holds at most one image and the prediction derived from it. All reads
//! and writes go through one mutex. The lock is released while a
//! prediction is computed; a generation counter bumped by every store
//! keeps a slow compute from caching its result over a newer image.

use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::error::{DetectorError, Result};
use crate::inference::{InferenceEngine, Prediction};

/// Receipt for a stored image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredImage {
    pub size_bytes: usize,
    pub timestamp: String,
}

/// Point-in-time view of the session, as reported by `/status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub image_uploaded: bool,
    pub image_size_bytes: usize,
    pub timestamp: Option<String>,
    pub prediction_cached: bool,
}

#[derive(Default)]
struct SessionState {
    image: Option<Bytes>,
    timestamp: Option<String>,
    prediction: Option<Prediction>,
    generation: u64,
}

impl SessionState {
    fn replace(&mut self, image: Bytes, prediction: Option<Prediction>) -> StoredImage {
        let timestamp = chrono::Utc::now().to_rfc3339();
        let stored = StoredImage {
            size_bytes: image.len(),
            timestamp: timestamp.clone(),
        };
        self.image = Some(image);
        self.timestamp = Some(timestamp);
        self.prediction = prediction;
        self.generation = self.generation.wrapping_add(1);
        stored
    }
}

/// Process-wide holder of the latest image and its prediction
#[derive(Default)]
pub struct SessionCache {
    state: Mutex<SessionState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current image and drop any cached prediction
    pub fn store_image(&self, image: Bytes) -> StoredImage {
        let stored = self.state.lock().replace(image, None);
        debug!(size_bytes = stored.size_bytes, "Stored image, prediction cache cleared");
        stored
    }

    /// Replace the current image together with its already computed prediction
    pub fn store_with_prediction(&self, image: Bytes, prediction: Prediction) -> StoredImage {
        self.state.lock().replace(image, Some(prediction))
    }

    /// Return the cached prediction, or compute, cache and return a new one.
    ///
    /// Fails with [`DetectorError::NoImage`] when nothing has been stored.
    pub fn get_or_compute<F>(&self, compute: F) -> Result<Prediction>
    where
        F: FnOnce(&[u8]) -> Result<Prediction>,
    {
        let (image, generation) = {
            let state = self.state.lock();
            let image = state.image.clone().ok_or(DetectorError::NoImage)?;
            if let Some(prediction) = &state.prediction {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Returning cached prediction");
                return Ok(prediction.clone());
            }
            (image, state.generation)
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(size_bytes = image.len(), "Running new prediction");
        let prediction = compute(&image)?;

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!("Image replaced during prediction, result not cached");
            return Ok(prediction);
        }
        // A concurrent caller may have committed first; keep its result
        Ok(state.prediction.get_or_insert(prediction).clone())
    }

    /// [`get_or_compute`](Self::get_or_compute) using `engine` to predict
    pub fn get_or_predict(&self, engine: &InferenceEngine) -> Result<Prediction> {
        self.get_or_compute(|image| engine.predict(image))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            image_uploaded: state.image.is_some(),
            image_size_bytes: state.image.as_ref().map(|i| i.len()).unwrap_or(0),
            timestamp: state.timestamp.clone(),
            prediction_cached: state.prediction.is_some(),
        }
    }

    /// Cache statistics: (hits, misses, hit_rate)
    pub fn stats(&self) -> (u64, u64, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 { hits as f64 / total as f64 } else { 0.0 };
        (hits, misses, hit_rate)
    }
}
