// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Banner and status line rendering.

use crate::status::{Severity, StatusReporter};

fn colors(severity: Severity) -> (egui::Color32, egui::Color32) {
    match severity {
        Severity::Success => (egui::Color32::from_rgb(236, 253, 245), egui::Color32::from_rgb(6, 95, 70)),
        Severity::Warning => (egui::Color32::from_rgb(255, 251, 235), egui::Color32::from_rgb(146, 64, 14)),
        Severity::Error => (egui::Color32::from_rgb(254, 242, 242), egui::Color32::from_rgb(153, 27, 27)),
        Severity::Info => (egui::Color32::from_rgb(239, 246, 255), egui::Color32::from_rgb(30, 64, 175)),
    }
}

/// Show the current banner, if any, with a dismiss button.
pub fn show_banner(ui: &mut egui::Ui, status: &mut StatusReporter) {
    let Some(banner) = status.banner() else {
        return;
    };
    let (fill, text) = colors(banner.severity);
    let title = banner.severity.title();
    let message = banner.message.clone();

    let mut dismissed = false;
    egui::Frame::none()
        .fill(fill)
        .rounding(6.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(title).strong().color(text));
                    ui.label(egui::RichText::new(message).color(text));
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                    if ui.small_button("✕").clicked() {
                        dismissed = true;
                    }
                });
            });
        });

    if dismissed {
        status.dismiss();
    }
}

/// Show the status line under the canvas.
pub fn show_status_line(ui: &mut egui::Ui, status: &StatusReporter, busy: bool) {
    let Some((severity, line)) = status.status_line() else {
        return;
    };
    let (fill, text) = colors(severity);
    egui::Frame::none()
        .fill(fill)
        .rounding(6.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                if busy {
                    ui.spinner();
                }
                ui.label(egui::RichText::new(line).strong().color(text));
            });
        });
}
