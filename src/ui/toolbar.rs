// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with endpoint configuration and the API test button.

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    ConfigureApi,
    TestApi,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, endpoint: &str, probing: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui
            .add_enabled(!probing, egui::Button::new("🔌 Test API"))
            .on_hover_text("Test API connection")
            .clicked()
        {
            action = ToolbarAction::TestApi;
        }
        if probing {
            ui.spinner();
        }

        if ui
            .button("⚙ Configure API")
            .on_hover_text("Set the tracking service URL")
            .clicked()
        {
            action = ToolbarAction::ConfigureApi;
        }

        ui.separator();

        if endpoint.is_empty() {
            ui.colored_label(egui::Color32::from_rgb(180, 120, 0), "⚠ API Not Configured");
        } else {
            ui.colored_label(egui::Color32::from_rgb(0, 140, 90), "✓ API Configured");
            ui.label(egui::RichText::new(endpoint).monospace().weak());
        }
    });

    action
}

/// Modal for editing the endpoint. Returns the entered URL on save.
pub fn configure_dialog(ctx: &egui::Context, draft: &mut String, open: &mut bool) -> Option<String> {
    let mut saved = None;
    let mut close = false;

    egui::Window::new("Configure API")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label("Enter your tracking API URL (from ngrok):");
            ui.label(egui::RichText::new("Example: https://abc123.ngrok.io").weak());
            let response = ui.add(egui::TextEdit::singleline(draft).desired_width(360.0));
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.horizontal(|ui| {
                if ui.button("Save").clicked() || submitted {
                    // An empty entry is treated like cancel
                    if !draft.trim().is_empty() {
                        saved = Some(draft.clone());
                    }
                    close = true;
                }
                if ui.button("Cancel").clicked() {
                    close = true;
                }
            });
        });

    if close {
        *open = false;
    }
    saved
}
