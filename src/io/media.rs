// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading and frame rendering.
//!
//! This module extracts the first frame of a video and keeps the raster
//! surface the annotation canvas displays, with the current box drawn on
//! top of a clean copy of that frame.

use crate::models::annotation::BoundingBox;
use anyhow::{bail, Context, Result};
use image::{ImageFormat, Rgba, RgbaImage};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Box outline color (#3B82F6).
pub const BOX_COLOR: Rgba<u8> = Rgba([59, 130, 246, 255]);

/// Box outline width in media pixels.
pub const BOX_STROKE: u32 = 3;

/// Something that can produce the first decodable frame of a video.
pub trait FrameDecoder: Send + Sync {
    /// Decode the frame at time 0 of the video at `location` (path or URL).
    fn first_frame(&self, location: &str) -> Result<RgbaImage>;
}

/// Decoder that runs the system `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    binary: PathBuf,
}

impl FfmpegDecoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn first_frame(&self, location: &str) -> Result<RgbaImage> {
        // Seek before opening the input so the first emitted frame is frame 0
        let output = Command::new(&self.binary)
            .args(["-v", "error", "-ss", "0", "-i"])
            .arg(location)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to run {}", self.binary.display()))?;

        if !output.status.success() || output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("Could not decode first frame of {}: {}", location, stderr.trim());
        }

        let frame = image::load_from_memory_with_format(&output.stdout, ImageFormat::Png)
            .context("ffmpeg produced an unreadable frame")?
            .to_rgba8();

        log::info!(
            "Decoded first frame of {} ({}x{})",
            location,
            frame.width(),
            frame.height()
        );
        Ok(frame)
    }
}

/// Decoder backed by OpenCV's video capture.
#[cfg(feature = "video-opencv")]
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCvDecoder;

#[cfg(feature = "video-opencv")]
impl FrameDecoder for OpenCvDecoder {
    fn first_frame(&self, location: &str) -> Result<RgbaImage> {
        use opencv::{core::Mat, imgproc, prelude::*, videoio};

        let mut capture = videoio::VideoCapture::from_file(location, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            bail!("Could not open video {}", location);
        }
        capture.set(videoio::CAP_PROP_POS_FRAMES, 0.0)?;

        let mut bgr = Mat::default();
        if !capture.read(&mut bgr)? || bgr.empty() {
            bail!("Could not read first frame of {}", location);
        }

        let mut rgba = Mat::default();
        imgproc::cvt_color(&bgr, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;

        let (width, height) = (rgba.cols() as u32, rgba.rows() as u32);
        let pixels = rgba.data_bytes()?.to_vec();
        RgbaImage::from_raw(width, height, pixels).context("Unexpected frame buffer size")
    }
}

/// Raster surface holding the first frame and the composited box overlay.
#[derive(Debug, Default)]
pub struct FrameRenderer {
    clean: Option<RgbaImage>,
    surface: Option<RgbaImage>,
    /// Bumped whenever `surface` changes so viewers know to re-upload it.
    revision: u64,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint the outcome of decoding a video's first frame.
    ///
    /// On failure the surface is left blank and a decode error is returned.
    pub fn render_frame(&mut self, decoded: Result<RgbaImage>) -> crate::error::Result<()> {
        match decoded {
            Ok(frame) => {
                self.surface = Some(frame.clone());
                self.clean = Some(frame);
                self.revision += 1;
                Ok(())
            }
            Err(e) => {
                self.clear();
                Err(crate::error::Error::Decode(format!("{:#}", e)))
            }
        }
    }

    /// Blank the surface.
    pub fn clear(&mut self) {
        self.clean = None;
        self.surface = None;
        self.revision += 1;
    }

    /// Intrinsic size of the painted frame.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.clean.as_ref().map(|f| f.dimensions())
    }

    pub fn surface(&self) -> Option<&RgbaImage> {
        self.surface.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Repaint the clean frame, then the box outline if any.
    pub fn overlay(&mut self, bbox: Option<&BoundingBox>) {
        let Some(clean) = &self.clean else {
            return;
        };
        let mut surface = clean.clone();
        if let Some(bbox) = bbox {
            stroke_box(&mut surface, bbox, BOX_COLOR, BOX_STROKE);
        }
        self.surface = Some(surface);
        self.revision += 1;
    }
}

/// Draw the outline of `bbox` into `image`, clipped to the image bounds.
fn stroke_box(image: &mut RgbaImage, bbox: &BoundingBox, color: Rgba<u8>, stroke: u32) {
    let (tl, br) = bbox.corners();
    let (width, height) = (image.width() as i64, image.height() as i64);
    if width == 0 || height == 0 {
        return;
    }

    // Keep corners near the image so the stroke arithmetic cannot overflow
    let margin = stroke as f64;
    let to_pixel = |v: f64, extent: i64| v.round().clamp(-margin, extent as f64 + margin) as i64;
    let x0 = to_pixel(tl.x, width);
    let y0 = to_pixel(tl.y, height);
    let x1 = to_pixel(br.x, width);
    let y1 = to_pixel(br.y, height);
    let half = stroke as i64 / 2;

    let mut fill = |ax: i64, ay: i64, bx: i64, by: i64| {
        let ax = ax.clamp(0, width);
        let bx = bx.clamp(0, width);
        let ay = ay.clamp(0, height);
        let by = by.clamp(0, height);
        for y in ay..by {
            for x in ax..bx {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    };

    let outer_x0 = x0 - half;
    let outer_y0 = y0 - half;
    let outer_x1 = x1 - half + stroke as i64;
    let outer_y1 = y1 - half + stroke as i64;

    // Top and bottom edges
    fill(outer_x0, outer_y0, outer_x1, outer_y0 + stroke as i64);
    fill(outer_x0, y1 - half, outer_x1, outer_y1);
    // Left and right edges
    fill(outer_x0, outer_y0, outer_x0 + stroke as i64, outer_y1);
    fill(x1 - half, outer_y0, outer_x1, outer_y1);
}
