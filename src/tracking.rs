// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tracking request flow as seen by the user.
//!
//! Ties the submission pipeline to the banners, the status line and the
//! result presenter. The application calls these from its UI thread while a
//! worker runs the blocking request.

use crate::error::{Error, Result};
use crate::models::annotation::BoundingBox;
use crate::models::video::VideoItem;
use crate::remote::pipeline::{Submission, SubmissionPipeline, SubmissionState, TrackingOutput};
use crate::result::ResultPresenter;
use crate::status::{Severity, StatusReporter};
use std::path::PathBuf;

/// Mutable view over the components a submission touches.
pub struct TrackingFlow<'a> {
    pub pipeline: &'a mut SubmissionPipeline,
    pub presenter: &'a mut ResultPresenter,
    pub status: &'a mut StatusReporter,
}

impl TrackingFlow<'_> {
    /// Validate the selection and enter `Preparing`.
    ///
    /// A missing precondition raises a warning banner and yields `None`.
    pub fn start(
        &mut self,
        video: Option<&VideoItem>,
        bbox: Option<BoundingBox>,
        endpoint: &str,
    ) -> Option<Submission> {
        let submission = match self.pipeline.begin(video, bbox, endpoint) {
            Ok(submission) => submission,
            Err(Error::Validation(e)) => {
                self.status.warn(e.to_string());
                return None;
            }
            Err(e) => {
                log::debug!("Submit ignored: {}", e);
                return None;
            }
        };

        self.status.dismiss();
        self.presenter.release();
        if submission.video().is_user_supplied() {
            self.status
                .set_status(Severity::Info, "Preparing video for tracking...");
        } else {
            self.status.set_status(Severity::Info, "Downloading video...");
        }
        Some(submission)
    }

    /// Record a state reported by the running submission.
    pub fn progress(&mut self, state: SubmissionState) {
        let line = match state {
            SubmissionState::Uploading => Some("Sending to API (GPU processing)..."),
            SubmissionState::AwaitingResult => Some("Processing complete! Downloading result..."),
            _ => None,
        };
        self.pipeline.advance(state);
        if let Some(line) = line {
            self.status.set_status(Severity::Info, line);
        }
    }

    /// Settle the submission. Returns the stored result file on success.
    ///
    /// `current` is false when the user moved to another video meanwhile;
    /// such a result is discarded.
    pub fn settle(&mut self, outcome: Result<TrackingOutput>, current: bool) -> Option<PathBuf> {
        self.pipeline.finish(&outcome);

        let output = match outcome {
            Ok(output) => output,
            Err(e) => {
                self.fail(&e);
                return None;
            }
        };

        if !current {
            log::info!("Discarding result, selection changed");
            self.status
                .info("A tracking result arrived for a video that is no longer selected.");
            return None;
        }

        match self.presenter.present(output) {
            Ok(handle) => {
                let path = handle.path().to_path_buf();
                self.status
                    .set_status(Severity::Success, "✅ Tracking completed successfully!");
                Some(path)
            }
            Err(e) => {
                self.fail(&e);
                None
            }
        }
    }

    /// The worker went away without reporting an outcome.
    pub fn abandon(&mut self) {
        log::error!("Tracking worker stopped without a result");
        self.settle(
            Err(Error::Transport("Tracking worker stopped unexpectedly".to_string())),
            true,
        );
    }

    fn fail(&mut self, err: &Error) {
        let message = err.user_message();
        self.status
            .set_status(Severity::Error, format!("❌ Error: {}", message));
        self.status.error(format!(
            "Failed to process video. {}. Check that the API is reachable and your bounding box is valid.",
            message
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Point;
    use crate::models::video::VideoCatalog;
    use crate::remote::transport::{HealthStatus, HttpReply, TrackForm, TrackingTransport};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that answers every `/track` with one fixed reply.
    struct FixedReply {
        status: u16,
        body: &'static [u8],
        calls: AtomicUsize,
    }

    impl FixedReply {
        fn new(status: u16, body: &'static [u8]) -> Self {
            Self {
                status,
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TrackingTransport for FixedReply {
        fn fetch_video(&self, _location: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(b"sample".to_vec())
        }

        fn post_track(&self, _endpoint: &str, _form: &TrackForm) -> Result<HttpReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HttpReply {
                status: self.status,
                content_type: Some("application/json".to_string()),
                headers: Vec::new(),
                body: self.body.to_vec(),
            })
        }

        fn get_health(&self, _endpoint: &str) -> Result<HealthStatus> {
            unreachable!("tracking never probes health")
        }
    }

    struct Fixture {
        pipeline: SubmissionPipeline,
        presenter: ResultPresenter,
        status: StatusReporter,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                pipeline: SubmissionPipeline::new(),
                presenter: ResultPresenter::new().unwrap(),
                status: StatusReporter::new(),
            }
        }

        fn flow(&mut self) -> TrackingFlow<'_> {
            TrackingFlow {
                pipeline: &mut self.pipeline,
                presenter: &mut self.presenter,
                status: &mut self.status,
            }
        }

        /// Start, run and settle one submission.
        fn track(
            &mut self,
            transport: &FixedReply,
            video: Option<&VideoItem>,
            bbox: Option<BoundingBox>,
            endpoint: &str,
        ) -> Option<PathBuf> {
            let submission = self.flow().start(video, bbox, endpoint)?;
            let mut states = Vec::new();
            let outcome = submission.run(transport, |state| states.push(state));
            for state in states {
                self.flow().progress(state);
            }
            self.flow().settle(outcome, true)
        }
    }

    fn cat_box() -> Option<BoundingBox> {
        Some(BoundingBox::from_drag(
            Point::new(50.0, 50.0),
            Point::new(150.0, 120.0),
        ))
    }

    #[test]
    fn test_cat_result_is_presented() {
        let catalog = VideoCatalog::builtin("test-videos");
        let transport = FixedReply::new(200, b"tracked-mp4");
        let mut fixture = Fixture::new();

        let path = fixture
            .track(&transport, catalog.get("test_cat"), cat_box(), "https://demo.example")
            .unwrap();

        assert_eq!(fixture.pipeline.state(), &SubmissionState::Complete);
        let handle = fixture.presenter.handle().unwrap();
        assert_eq!(handle.path(), path.as_path());
        assert_eq!(handle.media_type(), "video/mp4");
        assert_eq!(std::fs::read(&path).unwrap(), b"tracked-mp4");
        assert_eq!(
            fixture.status.status_line(),
            Some((Severity::Success, "✅ Tracking completed successfully!"))
        );
        assert!(fixture.status.banner().is_none());
    }

    #[test]
    fn test_missing_endpoint_warns_without_network() {
        let catalog = VideoCatalog::builtin("test-videos");
        let transport = FixedReply::new(200, b"");
        let mut fixture = Fixture::new();

        assert!(fixture
            .track(&transport, catalog.get("test_cat"), cat_box(), "")
            .is_none());

        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fixture.pipeline.state(), &SubmissionState::Idle);
        let banner = fixture.status.banner().unwrap();
        assert_eq!(banner.severity, Severity::Warning);
        assert!(banner.message.contains("Configure your API URL"));
    }

    #[test]
    fn test_server_error_raises_error_banner() {
        let catalog = VideoCatalog::builtin("test-videos");
        let transport = FixedReply::new(500, br#"{"error":"cuda oom"}"#);
        let mut fixture = Fixture::new();

        assert!(fixture
            .track(&transport, catalog.get("test_cat"), cat_box(), "https://demo.example")
            .is_none());

        assert_eq!(
            fixture.pipeline.state(),
            &SubmissionState::Failed("cuda oom".to_string())
        );
        assert!(fixture.presenter.handle().is_none());
        let banner = fixture.status.banner().unwrap();
        assert_eq!(banner.severity, Severity::Error);
        assert!(banner.message.starts_with("Failed to process video. cuda oom."));
        assert_eq!(
            fixture.status.status_line(),
            Some((Severity::Error, "❌ Error: cuda oom"))
        );
    }

    #[test]
    fn test_new_submission_releases_previous_result() {
        let catalog = VideoCatalog::builtin("test-videos");
        let transport = FixedReply::new(200, b"first");
        let mut fixture = Fixture::new();

        let first = fixture
            .track(&transport, catalog.get("test_cat"), cat_box(), "https://demo.example")
            .unwrap();
        fixture.pipeline.reset();

        let submission = fixture
            .flow()
            .start(catalog.get("test_car"), cat_box(), "https://demo.example")
            .unwrap();
        assert!(!first.exists());
        assert!(fixture.presenter.handle().is_none());
        assert_eq!(submission.video().id, "test_car");
        assert_eq!(
            fixture.status.status_line(),
            Some((Severity::Info, "Downloading video..."))
        );
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let catalog = VideoCatalog::builtin("test-videos");
        let transport = FixedReply::new(200, b"late");
        let mut fixture = Fixture::new();

        let submission = fixture
            .flow()
            .start(catalog.get("test_cat"), cat_box(), "https://demo.example")
            .unwrap();
        let outcome = submission.run(&transport, |_| {});
        assert!(fixture.flow().settle(outcome, false).is_none());

        assert!(fixture.presenter.handle().is_none());
        assert!(fixture.pipeline.can_submit());
        assert_eq!(fixture.status.banner().unwrap().severity, Severity::Info);
    }

    #[test]
    fn test_abandoned_worker_unblocks_submit() {
        let catalog = VideoCatalog::builtin("test-videos");
        let mut fixture = Fixture::new();

        fixture
            .flow()
            .start(catalog.get("test_cat"), cat_box(), "https://demo.example")
            .unwrap();
        assert!(!fixture.pipeline.can_submit());

        fixture.flow().abandon();
        assert!(fixture.pipeline.can_submit());
        assert!(matches!(fixture.pipeline.state(), SubmissionState::Failed(_)));
        assert_eq!(fixture.status.banner().unwrap().severity, Severity::Error);
    }
}
