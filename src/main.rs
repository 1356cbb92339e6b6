// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! VisioTrack - single-object video tracking client
//!
//! A cross-platform desktop application for marking an object on the first
//! frame of a video and sending it to a remote GPU tracking service.

mod app;
mod config;
mod editor;
mod error;
mod io;
mod models;
mod remote;
mod result;
mod status;
mod tracking;
mod ui;
mod util;

use anyhow::Result;
use app::VisioTrackApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("VisioTrack - Object Tracking"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "VisioTrack",
        options,
        Box::new(|_cc| {
            let app = VisioTrackApp::new()?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
