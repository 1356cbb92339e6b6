// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the first frame and box annotation.
//!
//! This module shows the rendered frame surface and translates pointer
//! gestures on it into media-space events for the box editor.

use crate::editor::PointerEvent;
use crate::models::annotation::Point;
use crate::util::geometry::{client_to_media, fit_size, ScreenRect};

/// What the canvas should display.
pub struct CanvasView<'a> {
    pub texture: Option<&'a egui::TextureHandle>,
    pub frame_size: Option<(u32, u32)>,
    pub editing_enabled: bool,
    pub loading_message: Option<&'a str>,
}

/// Display the frame and collect pointer events in arrival order.
pub fn show(ui: &mut egui::Ui, view: CanvasView<'_>) -> Vec<PointerEvent> {
    let mut events = Vec::new();
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(20);

    let available = ui.available_size();
    let height = (available.x * 9.0 / 16.0).min(available.y).max(120.0);

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(egui::vec2(available.x, height));

        if let Some(message) = view.loading_message {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.spinner();
                    ui.add_space(10.0);
                    ui.label(
                        egui::RichText::new(message)
                            .size(16.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                });
            });
            return;
        }

        let (Some(texture), Some((img_width, img_height))) = (view.texture, view.frame_size) else {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new("No frame available for this video")
                        .color(egui::Color32::from_gray(180)),
                );
            });
            return;
        };

        // Fit the frame in the canvas and center it
        let area = egui::vec2(ui.available_width(), height);
        let (display_width, display_height) =
            fit_size((img_width, img_height), (area.x as f64, area.y as f64));
        let display = egui::vec2(display_width as f32, display_height as f32);
        let offset = (area - display) / 2.0;
        let image_rect = egui::Rect::from_min_size(ui.min_rect().min + offset, display);

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        if !view.editing_enabled {
            return;
        }

        // Drag-only sense starts the drag on press instead of after a threshold
        let response = ui
            .allocate_rect(image_rect, egui::Sense::drag())
            .on_hover_cursor(egui::CursorIcon::Crosshair);

        let surface = ScreenRect::new(
            image_rect.min.x as f64,
            image_rect.min.y as f64,
            image_rect.width() as f64,
            image_rect.height() as f64,
        );
        let to_media = |pos: egui::Pos2| {
            client_to_media(Point::new(pos.x as f64, pos.y as f64), surface, (img_width, img_height))
        };

        let (pressed, released, press_origin) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.press_origin(),
            )
        });

        // The anchor is where the button went down, not where a drag was recognized
        if pressed && response.hovered() {
            if let Some(p) = press_origin
                .filter(|pos| image_rect.contains(*pos))
                .and_then(&to_media)
            {
                events.push(PointerEvent::Down(p));
            }
        }

        if response.dragged() {
            match response.interact_pointer_pos() {
                Some(pos) if image_rect.contains(pos) => {
                    if response.drag_delta() != egui::Vec2::ZERO {
                        if let Some(p) = to_media(pos) {
                            events.push(PointerEvent::Move(p));
                        }
                    }
                }
                _ => events.push(PointerEvent::Leave),
            }
        }

        if released || response.drag_stopped() {
            events.push(PointerEvent::Up);
        }
    });

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: (u32, u32) = (1280, 720);

    fn press(x: f32, y: f32, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: egui::pos2(x, y),
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    fn moved(x: f32, y: f32) -> egui::Event {
        egui::Event::PointerMoved(egui::pos2(x, y))
    }

    /// Run one egui frame per step and collect the canvas events.
    fn run_frames(steps: Vec<Vec<egui::Event>>) -> Vec<PointerEvent> {
        let ctx = egui::Context::default();
        let texture = ctx.load_texture(
            "frame",
            egui::ColorImage::new([FRAME.0 as usize, FRAME.1 as usize], egui::Color32::BLACK),
            egui::TextureOptions::LINEAR,
        );

        let mut events = Vec::new();
        // An initial empty frame lays the canvas out
        for (i, step) in std::iter::once(Vec::new()).chain(steps).enumerate() {
            let input = egui::RawInput {
                screen_rect: Some(egui::Rect::from_min_size(
                    egui::Pos2::ZERO,
                    egui::vec2(800.0, 600.0),
                )),
                time: Some(i as f64 * 0.05),
                events: step,
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    events.extend(show(
                        ui,
                        CanvasView {
                            texture: Some(&texture),
                            frame_size: Some(FRAME),
                            editing_enabled: true,
                            loading_message: None,
                        },
                    ));
                });
            });
        }
        events
    }

    #[test]
    fn test_anchor_is_press_position() {
        let events = run_frames(vec![
            vec![moved(200.0, 150.0)],
            vec![press(200.0, 150.0, true)],
            vec![moved(203.0, 150.0)],
            vec![moved(210.0, 150.0)],
            vec![moved(230.0, 150.0)],
            vec![moved(260.0, 150.0)],
            vec![press(260.0, 150.0, false)],
        ]);

        let downs: Vec<Point> = events
            .iter()
            .filter_map(|e| match e {
                PointerEvent::Down(p) => Some(*p),
                _ => None,
            })
            .collect();
        let moves: Vec<Point> = events
            .iter()
            .filter_map(|e| match e {
                PointerEvent::Move(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(downs.len(), 1);
        assert!(moves.len() >= 2);
        assert_eq!(events.first(), Some(&PointerEvent::Down(downs[0])));
        assert_eq!(events.last(), Some(&PointerEvent::Up));

        // Media pixels per screen point, from the last two moves (230 -> 260)
        let last = moves[moves.len() - 1];
        let before = moves[moves.len() - 2];
        let scale = (last.x - before.x) / 30.0;
        assert!(scale > 0.0);

        let anchor = downs[0];
        assert!((anchor.x - (last.x - 60.0 * scale)).abs() < 1e-3);
        assert!((anchor.y - last.y).abs() < 1e-9);
    }

    #[test]
    fn test_click_without_drag_reports_down_and_up() {
        let events = run_frames(vec![
            vec![moved(300.0, 200.0)],
            vec![press(300.0, 200.0, true)],
            vec![press(300.0, 200.0, false)],
        ]);

        assert!(matches!(events.first(), Some(PointerEvent::Down(_))));
        assert!(events.contains(&PointerEvent::Up));
        assert!(!events.iter().any(|e| matches!(e, PointerEvent::Move(_))));
    }

    #[test]
    fn test_press_outside_frame_is_ignored() {
        // 1280x720 in an 800x600 window leaves bars above and below the frame
        let events = run_frames(vec![
            vec![moved(400.0, 590.0)],
            vec![press(400.0, 590.0, true)],
            vec![moved(420.0, 590.0)],
        ]);
        assert!(!events.iter().any(|e| matches!(e, PointerEvent::Down(_))));
    }
}
