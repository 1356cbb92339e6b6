// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video list side panel.

use crate::models::video::VideoItem;

/// Result of video list interaction.
pub enum VideoListAction {
    None,
    Select(String),
    Upload,
}

/// Display the catalog with the upload button above it.
pub fn show(ui: &mut egui::Ui, videos: &[VideoItem], selected: Option<&str>) -> VideoListAction {
    let mut action = VideoListAction::None;

    ui.heading("Video List");
    ui.add_space(6.0);

    if ui
        .add_sized([ui.available_width(), 32.0], egui::Button::new("+ Upload Video"))
        .clicked()
    {
        action = VideoListAction::Upload;
    }

    ui.add_space(6.0);
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        for video in videos {
            let is_selected = selected == Some(video.id.as_str());
            let kind = if video.is_user_supplied() {
                "Uploaded"
            } else {
                "Test Video"
            };
            let text = format!("{}\n{}", video.display_name, kind);
            if ui
                .add_sized(
                    [ui.available_width(), 40.0],
                    egui::SelectableLabel::new(is_selected, text),
                )
                .clicked()
            {
                action = VideoListAction::Select(video.id.clone());
            }
        }
    });

    action
}
