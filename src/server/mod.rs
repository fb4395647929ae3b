//! Cat Detector Server Module
//!
//! HTTP façade over the inference engine: image ingestion (upload, base64,
//! camera pull), cached and direct prediction, and status endpoints.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::inference::{InferenceConfig, InferenceEngine};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    /// Camera endpoint serving one still image per GET
    pub camera_url: String,
    pub capture_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub max_upload_size: usize,
    pub serialize_inference: bool,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("API_PORT", 8000),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model.onnx")),
            camera_url: std::env::var("ESP32_CAPTURE_URL")
                .unwrap_or_else(|_| "http://192.168.4.1/capture".to_string()),
            capture_timeout_secs: env_or("CAPTURE_TIMEOUT_SECS", 10),
            probe_timeout_secs: env_or("PROBE_TIMEOUT_SECS", 5),
            max_upload_size: env_or("MAX_UPLOAD_SIZE", 10 * 1024 * 1024), // 10MB
            serialize_inference: env_or("SERIALIZE_INFERENCE", false),
        }
    }
}

impl ServerConfig {
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.capture_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Body limit for JSON routes carrying base64 images: room for an
    /// image of `max_upload_size` bytes after 4/3 encoding, plus the envelope
    pub fn max_json_body_size(&self) -> usize {
        self.max_upload_size
            .div_ceil(3)
            .saturating_mul(4)
            .saturating_add(4096)
    }

    /// Inference settings derived from this server configuration
    pub fn inference_config(&self) -> InferenceConfig {
        InferenceConfig::new()
            .with_model_path(self.model_path.clone())
            .with_serialized_inference(self.serialize_inference)
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        model_path = %config.model_path.display(),
        camera_url = %config.camera_url,
        started_at = %start_time.to_rfc3339(),
        "Loading model"
    );

    let engine = match InferenceEngine::load(config.inference_config()) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "Model could not be loaded, refusing to start");
            return Err(e.into());
        }
    };

    let state = Arc::new(AppState::new(config.clone(), engine)?);
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        max_upload_size_mb = config.max_upload_size / 1024 / 1024,
        capture_timeout_secs = config.capture_timeout_secs,
        "Cat Detector API starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
