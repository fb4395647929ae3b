//! Remote camera access
//!
//! Pulls single still images from an HTTP camera (an ESP32-CAM style
//! `/capture` endpoint). One GET per call, bounded by a timeout, no retries.

use bytes::Bytes;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::error::{DetectorError, Result};

/// Build an HTTP client for camera requests.
///
/// Redirects are not followed: a camera answering with anything but 200 is
/// treated as unavailable.
fn camera_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Fetch one image from `url` with a fresh client
pub async fn fetch_image(url: &str, timeout_secs: u64) -> Result<Bytes> {
    let timeout = Duration::from_secs(timeout_secs);
    let client = camera_http_client(timeout)?;
    get_image(&client, url, timeout).await
}

async fn get_image(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<Bytes> {
    let start = Instant::now();
    let response = client.get(url).timeout(timeout).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        warn!(url = %url, status = status.as_u16(), "Camera returned non-200 status");
        return Err(DetectorError::RemoteUnavailable(format!(
            "failed to fetch image from camera, status: {}",
            status.as_u16()
        )));
    }

    let body = response.bytes().await?;
    info!(
        url = %url,
        size_bytes = body.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Fetched image from camera"
    );
    Ok(body)
}

/// Outcome of a camera connectivity check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub status: &'static str,
    pub esp32_reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub esp32_url: String,
}

/// Client for the configured camera endpoint
#[derive(Debug, Clone)]
pub struct CameraClient {
    client: reqwest::Client,
    url: String,
    capture_timeout: Duration,
    probe_timeout: Duration,
}

impl CameraClient {
    pub fn new(url: impl Into<String>, capture_timeout: Duration, probe_timeout: Duration) -> Result<Self> {
        // Per-request timeouts below; the client-level one is only an upper bound
        let client = camera_http_client(capture_timeout.max(probe_timeout)).map_err(|e| {
            DetectorError::StartupFailure(format!("failed to create HTTP client: {}", e))
        })?;
        Ok(Self {
            client,
            url: url.into(),
            capture_timeout,
            probe_timeout,
        })
    }

    /// The capture URL images are pulled from
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Pull one image with the capture timeout
    pub async fn capture(&self) -> Result<Bytes> {
        self.fetch_image(&self.url, self.capture_timeout).await
    }

    /// Pull one image from `url`; fails with `RemoteUnavailable` on any
    /// non-200 answer, connection error or timeout
    pub async fn fetch_image(&self, url: &str, timeout: Duration) -> Result<Bytes> {
        get_image(&self.client, url, timeout).await
    }

    /// Check whether the camera answers. Never fails: errors are reported as data.
    pub async fn probe(&self) -> ProbeReport {
        let result = async {
            let response = self
                .client
                .get(&self.url)
                .timeout(self.probe_timeout)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body.len()))
        }
        .await;

        match result {
            Ok((status_code, image_size)) => ProbeReport {
                status: "success",
                esp32_reachable: true,
                status_code: Some(status_code),
                image_size: Some(image_size),
                error: None,
                esp32_url: self.url.clone(),
            },
            Err(e) => {
                warn!(url = %self.url, error = %e, "Camera probe failed");
                ProbeReport {
                    status: "error",
                    esp32_reachable: false,
                    status_code: None,
                    image_size: None,
                    error: Some(e.to_string()),
                    esp32_url: self.url.clone(),
                }
            }
        }
    }
}
