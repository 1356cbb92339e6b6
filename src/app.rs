// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module owns every component of the annotation workflow and wires
//! them to the UI. Slow work (frame decoding, reading uploads, talking to
//! the tracking service) runs on background threads that report back over
//! channels polled once per frame, so all state changes happen here on the
//! UI thread.

use crate::config::{self, EndpointConfig};
use crate::editor::{BoxEditor, EditorState};
use crate::error::{Error, Result as AppResult};
use crate::io::media::{FfmpegDecoder, FrameDecoder, FrameRenderer};
use crate::models::region::RegionData;
use crate::models::video::{is_video_file, VideoCatalog, VideoItem};
use crate::remote::health;
use crate::remote::pipeline::{SubmissionPipeline, SubmissionState, TrackingOutput};
use crate::remote::transport::{HealthStatus, HttpTransport, TrackingTransport};
use crate::result::{suggested_file_name, ResultPresenter};
use crate::tracking::TrackingFlow;
use crate::status::{Severity, StatusReporter, BANNER_TTL};
use crate::ui::{banner, canvas, result_panel, toolbar, video_list};
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of background video loading.
struct LoadedVideo {
    /// Load generation this result belongs to.
    token: u64,
    /// Path and bytes of a freshly picked upload.
    upload: Option<(PathBuf, Vec<u8>)>,
    frame: anyhow::Result<RgbaImage>,
}

/// Messages from a running submission.
enum SubmissionEvent {
    Progress(SubmissionState),
    Finished(AppResult<TrackingOutput>),
}

/// Main application state.
pub struct VisioTrackApp {
    catalog: VideoCatalog,
    selected_id: Option<String>,

    renderer: FrameRenderer,
    editor: BoxEditor,
    endpoint: EndpointConfig,
    pipeline: SubmissionPipeline,
    presenter: ResultPresenter,
    status: StatusReporter,

    decoder: Arc<dyn FrameDecoder>,
    transport: Arc<dyn TrackingTransport>,

    /// Displayed frame texture and the renderer revision it shows
    frame_texture: Option<egui::TextureHandle>,
    shown_revision: u64,

    /// Counter used to discard stale frame loads
    load_generation: u64,
    video_loader: Option<Receiver<LoadedVideo>>,
    loading_message: Option<String>,

    submission_events: Option<Receiver<SubmissionEvent>>,
    /// Video the in-flight submission was made for
    submission_video: Option<String>,

    health_probe: Option<Receiver<AppResult<HealthStatus>>>,

    preview_texture: Option<egui::TextureHandle>,
    preview_loader: Option<Receiver<Result<RgbaImage, String>>>,
    preview_failed: bool,

    configure_open: bool,
    endpoint_draft: String,
    help_open: bool,
}

impl VisioTrackApp {
    /// Create the application from persisted settings.
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = config::settings_path();
        let settings = config::load_settings(&settings_path);
        let endpoint = EndpointConfig::load(settings_path, config::BUILD_DEFAULT_ENDPOINT);

        #[cfg(feature = "video-opencv")]
        let decoder: Arc<dyn FrameDecoder> = Arc::new(crate::io::media::OpenCvDecoder);
        #[cfg(not(feature = "video-opencv"))]
        let decoder: Arc<dyn FrameDecoder> = Arc::new(FfmpegDecoder::new(&settings.ffmpeg_path));

        let transport: Arc<dyn TrackingTransport> = Arc::new(HttpTransport::new(None)?);

        Ok(Self {
            catalog: VideoCatalog::builtin(&settings.samples_location),
            selected_id: None,
            renderer: FrameRenderer::new(),
            editor: BoxEditor::new(),
            endpoint,
            pipeline: SubmissionPipeline::new(),
            presenter: ResultPresenter::new()?,
            status: StatusReporter::new(),
            decoder,
            transport,
            frame_texture: None,
            shown_revision: 0,
            load_generation: 0,
            video_loader: None,
            loading_message: None,
            submission_events: None,
            submission_video: None,
            health_probe: None,
            preview_texture: None,
            preview_loader: None,
            preview_failed: false,
            configure_open: false,
            endpoint_draft: String::new(),
            help_open: false,
        })
    }

    fn selected_video(&self) -> Option<&VideoItem> {
        self.selected_id.as_deref().and_then(|id| self.catalog.get(id))
    }

    /// Forget everything tied to the previous selection.
    fn clear_selection_state(&mut self) {
        self.editor.set_enabled(false);
        self.renderer.clear();
        self.release_result();
        self.pipeline.reset();
        self.status.clear_status();
    }

    fn release_result(&mut self) {
        self.presenter.release();
        self.preview_texture = None;
        self.preview_loader = None;
        self.preview_failed = false;
    }

    /// Select a catalog video and start decoding its first frame.
    fn select_video(&mut self, id: String) {
        let Some(location) = self.catalog.get(&id).map(|v| v.source_location.clone()) else {
            return;
        };
        log::info!("Selected video {}", id);
        self.selected_id = Some(id);
        self.clear_selection_state();

        self.load_generation += 1;
        let token = self.load_generation;
        let decoder = Arc::clone(&self.decoder);
        let (sender, receiver) = channel();
        self.video_loader = Some(receiver);
        self.loading_message = Some("Loading first frame...".to_string());

        std::thread::spawn(move || {
            let frame = decoder.first_frame(&location);
            let _ = sender.send(LoadedVideo {
                token,
                upload: None,
                frame,
            });
        });
    }

    /// Read a picked file and decode its first frame in the background.
    fn upload_video(&mut self, path: PathBuf) {
        if !is_video_file(&path) {
            self.status.warn(format!(
                "{} is not a supported video file.",
                path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
            ));
            return;
        }

        self.load_generation += 1;
        let token = self.load_generation;
        let decoder = Arc::clone(&self.decoder);
        let (sender, receiver) = channel();
        self.video_loader = Some(receiver);
        self.loading_message = Some("Loading video...".to_string());

        std::thread::spawn(move || {
            let loaded = match std::fs::read(&path) {
                Ok(bytes) => {
                    let frame = decoder.first_frame(&path.to_string_lossy());
                    LoadedVideo {
                        token,
                        upload: Some((path, bytes)),
                        frame,
                    }
                }
                Err(e) => LoadedVideo {
                    token,
                    upload: None,
                    frame: Err(anyhow::anyhow!("Failed to read {}: {}", path.display(), e)),
                },
            };
            let _ = sender.send(loaded);
        });
    }

    fn poll_video_loader(&mut self) {
        let Some(receiver) = &self.video_loader else {
            return;
        };
        let loaded = match receiver.try_recv() {
            Ok(loaded) => loaded,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => LoadedVideo {
                token: self.load_generation,
                upload: None,
                frame: Err(anyhow::anyhow!("Frame loader stopped unexpectedly")),
            },
        };
        self.video_loader = None;
        self.loading_message = None;

        if loaded.token != self.load_generation {
            log::debug!("Discarding stale frame load {}", loaded.token);
            return;
        }

        if let Some((path, bytes)) = loaded.upload {
            match self.catalog.add_upload(&path, bytes) {
                Some(id) => {
                    self.selected_id = Some(id);
                    self.clear_selection_state();
                }
                None => return,
            }
        }

        match self.renderer.render_frame(loaded.frame) {
            Ok(()) => self.editor.set_enabled(true),
            Err(e) => {
                self.editor.set_enabled(false);
                self.status.error(format!(
                    "Could not read the first frame of this video. {}",
                    e.user_message()
                ));
            }
        }
    }

    fn tracking(&mut self) -> TrackingFlow<'_> {
        TrackingFlow {
            pipeline: &mut self.pipeline,
            presenter: &mut self.presenter,
            status: &mut self.status,
        }
    }

    /// Validate and launch a tracking request.
    fn start_tracking(&mut self) {
        let video = self.selected_id.as_deref().and_then(|id| self.catalog.get(id));
        let mut flow = TrackingFlow {
            pipeline: &mut self.pipeline,
            presenter: &mut self.presenter,
            status: &mut self.status,
        };
        let Some(submission) = flow.start(video, self.editor.bbox(), self.endpoint.get()) else {
            return;
        };

        self.release_result();
        self.submission_video = Some(submission.video().id.clone());

        let transport = Arc::clone(&self.transport);
        let (sender, receiver) = channel();
        self.submission_events = Some(receiver);

        std::thread::spawn(move || {
            let progress = sender.clone();
            let outcome = submission.run(transport.as_ref(), |state| {
                let _ = progress.send(SubmissionEvent::Progress(state));
            });
            let _ = sender.send(SubmissionEvent::Finished(outcome));
        });
    }

    fn poll_submission(&mut self) {
        let Some(receiver) = &self.submission_events else {
            return;
        };
        let mut events = Vec::new();
        let disconnected = loop {
            match receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        };

        for event in events {
            match event {
                SubmissionEvent::Progress(state) => self.tracking().progress(state),
                SubmissionEvent::Finished(outcome) => {
                    self.submission_events = None;
                    let current = self.submission_video.take() == self.selected_id;
                    if let Some(path) = self.tracking().settle(outcome, current) {
                        self.load_preview(path);
                    }
                    return;
                }
            }
        }

        if disconnected {
            self.submission_events = None;
            self.submission_video = None;
            self.tracking().abandon();
        }
    }

    /// Decode the first frame of the result for the in-place preview.
    fn load_preview(&mut self, path: PathBuf) {
        let decoder = Arc::clone(&self.decoder);
        let (sender, receiver) = channel();
        self.preview_loader = Some(receiver);
        self.preview_failed = false;

        std::thread::spawn(move || {
            let frame = decoder
                .first_frame(&path.to_string_lossy())
                .map_err(|e| format!("{:#}", e));
            let _ = sender.send(frame);
        });
    }

    fn poll_preview(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.preview_loader else {
            return;
        };
        let frame = match receiver.try_recv() {
            Ok(frame) => frame,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err("preview decoder stopped".to_string()),
        };
        self.preview_loader = None;

        match frame {
            Ok(frame) => {
                self.preview_texture = Some(ctx.load_texture(
                    "result_preview",
                    to_color_image(&frame),
                    egui::TextureOptions::LINEAR,
                ));
            }
            Err(e) => self.report_playback_failure(&Error::Playback(e)),
        }
    }

    fn report_playback_failure(&mut self, err: &Error) {
        log::error!("Result playback failed: {}", err);
        self.preview_failed = true;
        self.status.set_status(
            Severity::Warning,
            "⚠ Video playback failed. The download button still works! Try re-generating or use a different player.",
        );
    }

    fn test_api(&mut self) {
        if !self.endpoint.is_configured() {
            self.status.warn("Please configure API URL first.");
            return;
        }
        let endpoint = self.endpoint.get().to_string();
        let transport = Arc::clone(&self.transport);
        let (sender, receiver) = channel();
        self.health_probe = Some(receiver);

        std::thread::spawn(move || {
            let _ = sender.send(health::probe(transport.as_ref(), &endpoint));
        });
    }

    fn poll_health(&mut self) {
        let Some(receiver) = &self.health_probe else {
            return;
        };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(Error::HealthCheck("Health check stopped unexpectedly".to_string()))
            }
        };
        self.health_probe = None;

        match result {
            Ok(status) => self.status.success(health::describe(&status)),
            Err(e) => self.status.warn(health::describe_failure(&e)),
        }
    }

    fn save_endpoint(&mut self, url: String) {
        match self.endpoint.set(&url) {
            Ok(()) => self.status.success("API URL saved. You can start testing now."),
            Err(e) => self.status.warn(format!(
                "API URL set for this session but could not be saved. {}",
                e.user_message()
            )),
        }
    }

    fn reset_box(&mut self) {
        self.editor.reset();
        self.renderer.overlay(None);
        self.release_result();
        self.pipeline.reset();
        self.status.clear_status();
    }

    fn download_result(&mut self) {
        let name = self
            .selected_video()
            .map(|v| v.display_name.clone())
            .unwrap_or_default();
        let Some(dest) = rfd::FileDialog::new()
            .add_filter("MP4 video", &["mp4"])
            .set_file_name(suggested_file_name(&name))
            .save_file()
        else {
            return;
        };
        match self.presenter.download_to(&dest) {
            Ok(()) => self.status.success(format!("Saved {}", dest.display())),
            Err(e) => self.status.error(format!("Could not save the result. {}", e.user_message())),
        }
    }

    fn export_region(&mut self) {
        let (Some(video), Some(bbox), Some(size)) = (
            self.selected_id.as_deref().and_then(|id| self.catalog.get(id)),
            self.editor.bbox(),
            self.renderer.frame_size(),
        ) else {
            self.status.warn("Select a video and draw a bounding box before exporting.");
            return;
        };
        let region = RegionData::new(video, size, bbox);

        let Some(path) = rfd::FileDialog::new()
            .add_filter("YAML", &["yaml", "yml"])
            .add_filter("JSON", &["json"])
            .set_file_name("region.yaml")
            .save_file()
        else {
            return;
        };
        match crate::io::serialization::export_region(&region, &path) {
            Ok(()) => log::info!("Exported region to {}", path.display()),
            Err(e) => self.status.error(format!("Failed to export region: {}", e)),
        }
    }

    /// Re-apply a previously exported box to the matching video.
    fn load_region(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Region", &["yaml", "yml", "json"])
            .pick_file()
        else {
            return;
        };
        let region = match crate::io::serialization::import_region(&path) {
            Ok(region) => region,
            Err(e) => {
                self.status.error(format!("Failed to load region: {}", e));
                return;
            }
        };

        if self.selected_id.as_deref() != Some(region.video_id.as_str()) {
            self.status.warn(format!(
                "This region was drawn on {}. Select that video first.",
                region.video_name
            ));
            return;
        }
        if self.renderer.frame_size() != Some((region.frame_width, region.frame_height)) {
            self.status
                .warn("The saved region does not match the size of the loaded frame.");
            return;
        }
        if self.editor.restore(region.bbox) {
            self.renderer.overlay(Some(&region.bbox));
            self.release_result();
            self.pipeline.reset();
            log::info!("Loaded region from {}", path.display());
        }
    }

    /// Push the renderer surface to the GPU when it changed.
    fn sync_frame_texture(&mut self, ctx: &egui::Context) {
        if self.renderer.revision() == self.shown_revision {
            return;
        }
        self.shown_revision = self.renderer.revision();

        match self.renderer.surface() {
            Some(surface) => {
                let image = to_color_image(surface);
                match &mut self.frame_texture {
                    Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        self.frame_texture =
                            Some(ctx.load_texture("frame", image, egui::TextureOptions::LINEAR));
                    }
                }
            }
            None => self.frame_texture = None,
        }
    }

    fn show_help(&mut self, ctx: &egui::Context) {
        egui::Window::new("How to Use")
            .open(&mut self.help_open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("1. Configure API: click Configure API and paste your tracking service URL");
                ui.label("2. Select Video: choose from the list or upload your own");
                ui.label("3. Draw Bounding Box: click and drag on the video frame");
                ui.label("4. Start Tracking: send the video and box to the GPU service");
                ui.label("5. Download Result: save the tracked video when complete");
            });
    }
}

impl Drop for VisioTrackApp {
    fn drop(&mut self) {
        self.catalog.release_uploads();
        self.presenter.release();
    }
}

fn to_color_image(image: &RgbaImage) -> egui::ColorImage {
    let size = [image.width() as usize, image.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw())
}

impl eframe::App for VisioTrackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_video_loader();
        self.poll_submission();
        self.poll_health();
        self.poll_preview(ctx);
        self.status.expire(Instant::now(), BANNER_TTL);

        // Keep repainting while background work is outstanding
        if self.video_loader.is_some()
            || self.submission_events.is_some()
            || self.health_probe.is_some()
            || self.preview_loader.is_some()
        {
            ctx.request_repaint_after(Duration::from_millis(50));
        } else if self.status.banner().is_some() {
            ctx.request_repaint_after(Duration::from_secs(1));
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Upload Video...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Videos", &["mp4", "mov", "webm", "mkv", "avi", "m4v"])
                            .pick_file()
                        {
                            self.upload_video(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Load Region...").clicked() {
                        self.load_region();
                        ui.close_menu();
                    }
                    if ui.button("Export Region...").clicked() {
                        self.export_region();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let has_box = self.editor.bbox().is_some();
                    if ui.add_enabled(has_box, egui::Button::new("Reset Box (Esc)")).clicked() {
                        self.reset_box();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("How to Use").clicked() {
                        self.help_open = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(ui, self.endpoint.get(), self.health_probe.is_some())
            })
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::ConfigureApi => {
                self.endpoint_draft = self.endpoint.get().to_string();
                self.configure_open = true;
            }
            toolbar::ToolbarAction::TestApi => self.test_api(),
            toolbar::ToolbarAction::None => {}
        }

        if self.configure_open {
            if let Some(url) =
                toolbar::configure_dialog(ctx, &mut self.endpoint_draft, &mut self.configure_open)
            {
                self.save_endpoint(url);
            }
        }
        if self.help_open {
            self.show_help(ctx);
        }

        // Video list (left side)
        let list_action = egui::SidePanel::left("video_list")
            .default_width(240.0)
            .show(ctx, |ui| {
                video_list::show(ui, self.catalog.items(), self.selected_id.as_deref())
            })
            .inner;
        match list_action {
            video_list::VideoListAction::Select(id) => {
                if self.selected_id.as_deref() != Some(id.as_str()) {
                    self.select_video(id);
                }
            }
            video_list::VideoListAction::Upload => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Videos", &["mp4", "mov", "webm", "mkv", "avi", "m4v"])
                    .pick_file()
                {
                    self.upload_video(path);
                }
            }
            video_list::VideoListAction::None => {}
        }

        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.reset_box();
        }

        self.sync_frame_texture(ctx);

        // Main area (center)
        egui::CentralPanel::default().show(ctx, |ui| {
            banner::show_banner(ui, &mut self.status);
            ui.add_space(6.0);

            let Some(video) = self.selected_video() else {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.heading(
                            egui::RichText::new("No Video Selected")
                                .size(28.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                        ui.label(
                            egui::RichText::new(
                                "Choose a video from the list or upload your own to start tracking objects",
                            )
                            .color(egui::Color32::from_gray(160)),
                        );
                    });
                });
                return;
            };
            let title = video.display_name.clone();

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading(title);
                ui.label(
                    egui::RichText::new("Draw a bounding box around the object you want to track")
                        .weak(),
                );
                ui.add_space(6.0);

                let events = canvas::show(
                    ui,
                    canvas::CanvasView {
                        texture: self.frame_texture.as_ref(),
                        frame_size: self.renderer.frame_size(),
                        editing_enabled: self.editor.is_enabled(),
                        loading_message: self.loading_message.as_deref(),
                    },
                );
                let mut changed = false;
                for event in events {
                    if self.editor.handle(event) {
                        self.renderer.overlay(self.editor.bbox().as_ref());
                        changed = true;
                    }
                }
                if changed {
                    ctx.request_repaint();
                }

                if let Some(bbox) = self.editor.bbox() {
                    ui.add_space(6.0);
                    ui.group(|ui| {
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new("Bounding Box Coordinates:").strong());
                            if matches!(self.editor.state(), EditorState::Drawing { .. }) {
                                ui.label(egui::RichText::new("drawing...").italics().weak());
                            }
                        });
                        egui::Grid::new("bbox_grid").num_columns(2).show(ui, |ui| {
                            ui.label(format!("X: {}", bbox.x.round()));
                            ui.label(format!("Y: {}", bbox.y.round()));
                            ui.end_row();
                            ui.label(format!("Width: {}", bbox.width.round()));
                            ui.label(format!("Height: {}", bbox.height.round()));
                            ui.end_row();
                        });
                    });
                }

                ui.add_space(8.0);
                let busy = self.pipeline.state().is_in_flight();
                ui.horizontal(|ui| {
                    if ui.button("Reset").clicked() {
                        self.reset_box();
                    }
                    let can_track = self.editor.bbox().is_some()
                        && self.endpoint.is_configured()
                        && self.pipeline.can_submit();
                    let label = if busy {
                        "Processing..."
                    } else {
                        "🚀 Start Tracking (GPU)"
                    };
                    if ui.add_enabled(can_track, egui::Button::new(label)).clicked() {
                        self.start_tracking();
                    }
                });

                ui.add_space(8.0);
                banner::show_status_line(ui, &self.status, busy);

                let mut result_action = result_panel::ResultAction::None;
                if let Some(handle) = self.presenter.handle() {
                    ui.add_space(10.0);
                    ui.separator();
                    result_action = result_panel::show(
                        ui,
                        handle,
                        self.preview_texture.as_ref(),
                        self.preview_failed,
                    );
                }
                match result_action {
                    result_panel::ResultAction::Download => self.download_result(),
                    result_panel::ResultAction::OpenInPlayer => {
                        if let Err(e) = self.presenter.open_in_player() {
                            self.report_playback_failure(&e);
                        }
                    }
                    result_panel::ResultAction::None => {}
                }
            });
        });
    }
}
