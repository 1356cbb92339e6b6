// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tracking result panel: preview, download and external playback.

use crate::result::ResultHandle;

/// Result of result panel interaction.
pub enum ResultAction {
    None,
    Download,
    OpenInPlayer,
}

/// Display the current result. `preview` is the first frame of the tracked
/// video when it could be decoded.
pub fn show(
    ui: &mut egui::Ui,
    handle: &ResultHandle,
    preview: Option<&egui::TextureHandle>,
    preview_failed: bool,
) -> ResultAction {
    let mut action = ResultAction::None;

    ui.horizontal(|ui| {
        ui.heading("Tracking Result");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("📥 Download Video").clicked() {
                action = ResultAction::Download;
            }
            if ui.button("▶ Open in Player").clicked() {
                action = ResultAction::OpenInPlayer;
            }
        });
    });

    let mut details = vec![format!("{} KiB, {}", handle.size() / 1024, handle.media_type())];
    if let Some(frames) = handle.frames_processed {
        details.push(format!("{} frames", frames));
    }
    if let Some(resolution) = &handle.resolution {
        details.push(resolution.clone());
    }
    if let Some(fps) = handle.fps {
        details.push(format!("{} fps", fps));
    }
    ui.label(egui::RichText::new(details.join(" · ")).weak());

    if let Some(texture) = preview {
        let size = texture.size_vec2();
        let width = ui.available_width().min(size.x);
        let scaled = egui::vec2(width, width * size.y / size.x);
        ui.image((texture.id(), scaled));
    } else if preview_failed {
        ui.label(
            egui::RichText::new("Preview unavailable. The download button still works.")
                .italics()
                .weak(),
        );
    } else {
        ui.spinner();
    }

    action
}
