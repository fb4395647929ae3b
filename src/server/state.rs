//! Application state management

use std::sync::Arc;

use crate::cache::SessionCache;
use crate::error::Result;
use crate::inference::InferenceEngine;
use crate::remote::CameraClient;

use super::ServerConfig;

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub engine: Arc<InferenceEngine>,
    pub session: SessionCache,
    pub camera: CameraClient,
}

impl AppState {
    pub fn new(config: ServerConfig, engine: InferenceEngine) -> Result<Self> {
        let camera = CameraClient::new(
            config.camera_url.clone(),
            config.capture_timeout(),
            config.probe_timeout(),
        )?;

        Ok(Self {
            engine: Arc::new(engine),
            session: SessionCache::new(),
            camera,
            config,
        })
    }
}
