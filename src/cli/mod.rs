//! Cat Detector CLI Module
//!
//! Command-line interface for running the server and classifying local files.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::inference::{InferenceConfig, InferenceEngine};
use crate::server::{run_server, ServerConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {} {}", muted(&format!("{:<14}", key)), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cat-detector")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP service that tells cats from not-cats in camera images")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Bind address
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "API_PORT", default_value = "8000")]
        port: u16,

        /// ONNX model file
        #[arg(short, long, env = "MODEL_PATH", default_value = "model.onnx")]
        model: PathBuf,

        /// Camera capture URL
        #[arg(long, env = "ESP32_CAPTURE_URL")]
        camera_url: Option<String>,
    },

    /// Classify a local image file and print the prediction as JSON
    Predict {
        /// ONNX model file
        #[arg(short, long, env = "MODEL_PATH", default_value = "model.onnx")]
        model: PathBuf,

        /// Image file (JPEG, PNG, ...)
        image: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn print_banner(config: &ServerConfig) {
    let base = format!("http://{}:{}", config.host, config.port);

    section(&format!("Cat Detector API v{}", env!("CARGO_PKG_VERSION")));
    kv("Listening", &base);
    kv("Model", &config.model_path.display().to_string());
    kv("Camera", &config.camera_url);

    section("Endpoints");
    for (method, path, what) in [
        ("GET ", "/analyze-live", "fetch from camera + predict"),
        ("POST", "/capture-and-store", "fetch from camera + store"),
        ("POST", "/upload-image", "upload image (multipart)"),
        ("POST", "/upload-image-base64", "upload base64 image"),
        ("GET ", "/get-prediction", "prediction for stored image"),
        ("POST", "/predict", "direct predict (base64)"),
        ("GET ", "/status", "system status"),
        ("GET ", "/test-esp32", "test camera connection"),
    ] {
        println!("  {} {:<22} {}", ok(method), path, dim(what));
    }
    println!();
    println!("  {}", dim("ctrl+c to stop"));
    println!();
}

pub async fn cmd_serve(host: &str, port: u16, model: &Path, camera_url: Option<&str>) -> anyhow::Result<()> {
    let mut config = ServerConfig {
        host: host.to_string(),
        port,
        model_path: model.to_path_buf(),
        ..Default::default()
    };
    if let Some(url) = camera_url {
        config.camera_url = url.to_string();
    }

    print_banner(&config);
    run_server(config).await
}

pub fn cmd_predict(model: &Path, image: &Path) -> anyhow::Result<()> {
    let engine = InferenceEngine::load(InferenceConfig::new().with_model_path(model))?;
    let bytes = std::fs::read(image)?;

    let start = Instant::now();
    let prediction = engine.predict(&bytes)?;
    let elapsed = start.elapsed();

    println!("{}", serde_json::to_string_pretty(&prediction)?);
    let verdict = if prediction.is_cat { ok("cat") } else { muted("not a cat") };
    eprintln!(
        "  {} {} {}",
        verdict,
        dim(&format!("{:.1}%", prediction.confidence * 100.0)),
        dim(&format!("({:.1} ms)", elapsed.as_secs_f64() * 1000.0)),
    );
    Ok(())
}
