// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Wire access to the remote tracking service.
//!
//! The pipeline talks to a `TrackingTransport`; `HttpTransport` is the
//! reqwest implementation used by the application.

use crate::error::{Error, Result};
use crate::models::annotation::CanonicalBox;
use crate::models::video::is_remote;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Header that makes the ngrok tunnel skip its browser warning page.
pub const TUNNEL_BYPASS_HEADER: (&str, &str) = ("ngrok-skip-browser-warning", "true");

/// File name given to the uploaded video part.
pub const UPLOAD_FILE_NAME: &str = "video.mp4";

/// Media type given to uploaded and returned videos.
pub const VIDEO_MEDIA_TYPE: &str = "video/mp4";

/// Multipart body of a `/track` request.
#[derive(Debug, Clone)]
pub struct TrackForm {
    pub video: Arc<[u8]>,
    pub bbox: CanonicalBox,
}

impl TrackForm {
    /// Text fields in the order they are sent.
    pub fn fields(&self) -> [(&'static str, String); 4] {
        [
            ("bbox_x", self.bbox.x.to_string()),
            ("bbox_y", self.bbox.y.to_string()),
            ("bbox_w", self.bbox.width.to_string()),
            ("bbox_h", self.bbox.height.to_string()),
        ]
    }
}

/// An HTTP response, uninterpreted.
#[derive(Debug, Clone, Default)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub gpu_available: bool,
    #[serde(default)]
    pub gpu_name: Option<String>,
    #[serde(default)]
    pub model_loaded: Option<bool>,
}

/// Network operations needed by submission and the health probe.
///
/// `Err` means no HTTP response was obtained; a non-success status is still
/// an `Ok` reply for the caller to interpret.
pub trait TrackingTransport: Send + Sync {
    /// Read the bytes of a catalog sample.
    fn fetch_video(&self, location: &str) -> Result<Vec<u8>>;

    /// `POST {endpoint}/track`.
    fn post_track(&self, endpoint: &str, form: &TrackForm) -> Result<HttpReply>;

    /// `GET {endpoint}/health`.
    fn get_health(&self, endpoint: &str) -> Result<HealthStatus>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    http_client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a client. `None` disables the request timeout, since tracking
    /// a long video can take minutes.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let builder = reqwest::blocking::Client::builder().timeout(timeout);
        let http_client = builder.build()?;
        Ok(Self { http_client })
    }
}

impl TrackingTransport for HttpTransport {
    fn fetch_video(&self, location: &str) -> Result<Vec<u8>> {
        if !is_remote(location) {
            return std::fs::read(location)
                .map_err(|e| Error::Fetch(format!("Failed to read {}: {}", location, e)));
        }

        log::info!("Downloading sample video {}", location);
        let response = self
            .http_client
            .get(location)
            .send()
            .map_err(|e| Error::Fetch(format!("Failed to fetch video: {}", e)))?;
        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "Failed to fetch video: HTTP {}",
                response.status().as_u16()
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| Error::Fetch(format!("Failed to fetch video: {}", e)))?;
        Ok(bytes.to_vec())
    }

    fn post_track(&self, endpoint: &str, form: &TrackForm) -> Result<HttpReply> {
        let url = format!("{}/track", endpoint);

        let video_part = reqwest::blocking::multipart::Part::bytes(form.video.to_vec())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(VIDEO_MEDIA_TYPE)?;
        let mut multipart = reqwest::blocking::multipart::Form::new().part("video", video_part);
        for (name, value) in form.fields() {
            multipart = multipart.text(name, value);
        }

        log::info!(
            "Sending {} bytes to {} (bbox {:?})",
            form.video.len(),
            url,
            form.bbox
        );
        let response = self
            .http_client
            .post(&url)
            .header(TUNNEL_BYPASS_HEADER.0, TUNNEL_BYPASS_HEADER.1)
            .multipart(multipart)
            .send()?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect::<Vec<_>>();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes()?.to_vec();

        log::info!("Tracking service answered {} ({} bytes)", status, body.len());
        Ok(HttpReply {
            status,
            content_type,
            headers,
            body,
        })
    }

    fn get_health(&self, endpoint: &str) -> Result<HealthStatus> {
        let url = format!("{}/health", endpoint);
        let response = self
            .http_client
            .get(&url)
            .header(TUNNEL_BYPASS_HEADER.0, TUNNEL_BYPASS_HEADER.1)
            .send()
            .map_err(|e| Error::HealthCheck(e.to_string()))?;
        response
            .json::<HealthStatus>()
            .map_err(|e| Error::HealthCheck(e.to_string()))
    }
}
