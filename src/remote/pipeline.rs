// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tracking submission state machine.
//!
//! `SubmissionPipeline::begin` validates the selection and hands out a
//! `Submission`, the only value that can talk to the remote service. The
//! pipeline refuses to hand out a second one until the first has been
//! finished, so at most one request is ever in flight.

use super::transport::{HttpReply, TrackForm, TrackingTransport, VIDEO_MEDIA_TYPE};
use crate::error::{Error, Result, ValidationError};
use crate::models::annotation::{BoundingBox, CanonicalBox};
use crate::models::video::VideoItem;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Preparing,
    Uploading,
    AwaitingResult,
    Complete,
    Failed(String),
}

impl SubmissionState {
    /// True between `begin` and `finish`.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SubmissionState::Preparing | SubmissionState::Uploading | SubmissionState::AwaitingResult
        )
    }

    fn rank(&self) -> u8 {
        match self {
            SubmissionState::Idle => 0,
            SubmissionState::Preparing => 1,
            SubmissionState::Uploading => 2,
            SubmissionState::AwaitingResult => 3,
            SubmissionState::Complete | SubmissionState::Failed(_) => 4,
        }
    }
}

/// Tracked video returned by the service.
#[derive(Debug, Clone)]
pub struct TrackingOutput {
    pub bytes: Vec<u8>,
    /// Always `video/mp4`; the service's own content type is ignored.
    pub media_type: &'static str,
    pub frames_processed: Option<u64>,
    pub resolution: Option<String>,
    pub fps: Option<f64>,
}

/// A validated request, ready to run.
#[derive(Debug)]
pub struct Submission {
    video: VideoItem,
    bbox: BoundingBox,
    endpoint: String,
}

impl Submission {
    pub fn video(&self) -> &VideoItem {
        &self.video
    }

    /// Box in the form it is transmitted.
    pub fn canonical_box(&self) -> CanonicalBox {
        self.bbox.canonical()
    }

    /// Execute the request. `progress` receives each state entered after
    /// `Preparing`. Blocks on network I/O.
    pub fn run(
        self,
        transport: &dyn TrackingTransport,
        mut progress: impl FnMut(SubmissionState),
    ) -> Result<TrackingOutput> {
        let video = self.resolve_video(transport)?;

        progress(SubmissionState::Uploading);
        if self.bbox.is_reversed() {
            log::warn!(
                "Box was drawn right-to-left or bottom-to-top; the submitted region {:?} extends from the anchor, not over the drawn outline",
                self.canonical_box()
            );
        }
        let form = TrackForm {
            video,
            bbox: self.canonical_box(),
        };
        let reply = transport.post_track(&self.endpoint, &form)?;

        progress(SubmissionState::AwaitingResult);
        interpret_reply(reply)
    }

    fn resolve_video(&self, transport: &dyn TrackingTransport) -> Result<Arc<[u8]>> {
        if let Some(bytes) = self.video.upload_bytes() {
            return Ok(bytes);
        }
        log::info!("Fetching {} from {}", self.video.id, self.video.source_location);
        match transport.fetch_video(&self.video.source_location) {
            Ok(bytes) => Ok(Arc::from(bytes)),
            Err(Error::Fetch(msg)) => Err(Error::Fetch(msg)),
            Err(e) => Err(Error::Fetch(e.user_message())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

fn interpret_reply(reply: HttpReply) -> Result<TrackingOutput> {
    if !reply.is_success() {
        let message = server_message(&reply.body)
            .unwrap_or_else(|| format!("Server error: {}", reply.status));
        return Err(Error::Http {
            status: reply.status,
            message,
        });
    }

    if let Some(declared) = reply.content_type.as_deref() {
        if declared != VIDEO_MEDIA_TYPE {
            log::debug!("Service declared {}, treating result as {}", declared, VIDEO_MEDIA_TYPE);
        }
    }

    Ok(TrackingOutput {
        frames_processed: reply.header("X-Frames-Processed").and_then(|v| v.parse().ok()),
        resolution: reply.header("X-Resolution").map(str::to_string),
        fps: reply.header("X-FPS").and_then(|v| v.parse().ok()),
        bytes: reply.body,
        media_type: VIDEO_MEDIA_TYPE,
    })
}

/// Error text from a JSON body: `error`, else a string `detail`.
fn server_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed
        .error
        .or_else(|| parsed.detail.and_then(|d| d.as_str().map(str::to_string)))
        .filter(|m| !m.is_empty())
}

/// Owner of the single submission state.
#[derive(Debug)]
pub struct SubmissionPipeline {
    state: SubmissionState,
}

impl Default for SubmissionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionPipeline {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn can_submit(&self) -> bool {
        !self.state.is_in_flight()
    }

    /// Validate the selection and enter `Preparing`.
    ///
    /// Preconditions are checked in order: video, box, endpoint. On any
    /// error the state is left untouched.
    pub fn begin(
        &mut self,
        video: Option<&VideoItem>,
        bbox: Option<BoundingBox>,
        endpoint: &str,
    ) -> Result<Submission> {
        if self.state.is_in_flight() {
            log::warn!("Ignoring submit while {:?}", self.state);
            return Err(Error::Busy);
        }
        let video = video.ok_or(ValidationError::MissingVideo)?;
        let bbox = bbox.ok_or(ValidationError::MissingBox)?;
        if endpoint.trim().is_empty() {
            return Err(ValidationError::MissingEndpoint.into());
        }

        self.transition(SubmissionState::Preparing);
        Ok(Submission {
            video: video.clone(),
            bbox,
            endpoint: endpoint.to_string(),
        })
    }

    /// Record progress reported by a running submission.
    ///
    /// Only forward moves within an in-flight submission are applied.
    pub fn advance(&mut self, next: SubmissionState) {
        if self.state.is_in_flight() && next.is_in_flight() && next.rank() > self.state.rank() {
            self.transition(next);
        }
    }

    /// Settle the in-flight submission.
    pub fn finish(&mut self, outcome: &Result<TrackingOutput>) {
        if !self.state.is_in_flight() {
            log::warn!("finish() called while {:?}", self.state);
            return;
        }
        match outcome {
            Ok(_) => self.transition(SubmissionState::Complete),
            Err(e) => self.transition(SubmissionState::Failed(e.user_message())),
        }
    }

    /// Return to `Idle` from `Complete` or `Failed`.
    pub fn reset(&mut self) {
        if !self.state.is_in_flight() {
            self.transition(SubmissionState::Idle);
        }
    }

    fn transition(&mut self, next: SubmissionState) {
        if self.state != next {
            log::info!("Submission {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}
