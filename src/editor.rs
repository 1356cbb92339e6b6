// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-driven bounding box editing.
//!
//! The editor consumes pointer events that have already been mapped into
//! media space, so it can be driven without a window or real input.

use crate::models::annotation::{BoundingBox, Point};

/// Pointer input in media pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

/// Editing state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorState {
    Idle,
    Drawing { anchor: Point },
}

/// Single-box editor. At most one box exists at a time.
#[derive(Debug)]
pub struct BoxEditor {
    state: EditorState,
    bbox: Option<BoundingBox>,
    enabled: bool,
}

impl Default for BoxEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxEditor {
    /// Create an editor that ignores input until a frame is available.
    pub fn new() -> Self {
        Self {
            state: EditorState::Idle,
            bbox: None,
            enabled: false,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// The current box, committed or in progress.
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable editing. Disabling also clears the box.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.reset();
        }
        self.enabled = enabled;
    }

    /// Apply one pointer event. Returns true if the box changed and the
    /// frame should be redrawn.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        if !self.enabled {
            return false;
        }

        match (self.state, event) {
            (_, PointerEvent::Down(anchor)) => {
                let had_box = self.bbox.take().is_some();
                self.state = EditorState::Drawing { anchor };
                log::debug!("Box drag started at ({:.1}, {:.1})", anchor.x, anchor.y);
                had_box
            }
            (EditorState::Drawing { anchor }, PointerEvent::Move(current)) => {
                self.bbox = Some(BoundingBox::from_drag(anchor, current));
                true
            }
            (EditorState::Drawing { .. }, PointerEvent::Up | PointerEvent::Leave) => {
                self.state = EditorState::Idle;
                if let Some(bbox) = self.bbox {
                    log::info!(
                        "Committed box x={:.1} y={:.1} w={:.1} h={:.1}",
                        bbox.x,
                        bbox.y,
                        bbox.width,
                        bbox.height
                    );
                }
                false
            }
            (EditorState::Idle, _) => false,
        }
    }

    /// Replace the box with a saved one. Ignored while disabled.
    pub fn restore(&mut self, bbox: BoundingBox) -> bool {
        if !self.enabled {
            return false;
        }
        self.state = EditorState::Idle;
        self.bbox = Some(bbox);
        true
    }

    /// Clear the box and return to idle, whatever the current state.
    pub fn reset(&mut self) {
        self.state = EditorState::Idle;
        self.bbox = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_editor() -> BoxEditor {
        let mut editor = BoxEditor::new();
        editor.set_enabled(true);
        editor
    }

    #[test]
    fn test_restore_requires_frame() {
        let saved = BoundingBox {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
        };
        let mut editor = BoxEditor::new();
        assert!(!editor.restore(saved));
        assert!(editor.bbox().is_none());

        editor.set_enabled(true);
        editor.handle(PointerEvent::Down(Point::new(0.0, 0.0)));
        assert!(editor.restore(saved));
        assert_eq!(editor.bbox(), Some(saved));
        assert_eq!(editor.state(), EditorState::Idle);
    }

    #[test]
    fn test_drag_produces_box() {
        let mut editor = enabled_editor();
        editor.handle(PointerEvent::Down(Point::new(50.0, 50.0)));
        assert_eq!(editor.state(), EditorState::Drawing { anchor: Point::new(50.0, 50.0) });
        assert!(editor.bbox().is_none());

        assert!(editor.handle(PointerEvent::Move(Point::new(100.0, 80.0))));
        assert!(editor.handle(PointerEvent::Move(Point::new(150.0, 120.0))));
        editor.handle(PointerEvent::Up);

        assert_eq!(editor.state(), EditorState::Idle);
        assert_eq!(
            editor.bbox(),
            Some(BoundingBox {
                x: 50.0,
                y: 50.0,
                width: 100.0,
                height: 70.0,
            })
        );
    }

    #[test]
    fn test_leave_commits_like_up() {
        let mut editor = enabled_editor();
        editor.handle(PointerEvent::Down(Point::new(10.0, 10.0)));
        editor.handle(PointerEvent::Move(Point::new(5.0, 2.0)));
        editor.handle(PointerEvent::Leave);

        assert_eq!(editor.state(), EditorState::Idle);
        let bbox = editor.bbox().unwrap();
        assert_eq!(bbox.width, -5.0);
        assert_eq!(bbox.height, -8.0);

        // Moves after the drag ended do nothing
        assert!(!editor.handle(PointerEvent::Move(Point::new(99.0, 99.0))));
        assert_eq!(editor.bbox(), Some(bbox));
    }

    #[test]
    fn test_new_drag_replaces_box() {
        let mut editor = enabled_editor();
        editor.handle(PointerEvent::Down(Point::new(0.0, 0.0)));
        editor.handle(PointerEvent::Move(Point::new(20.0, 20.0)));
        editor.handle(PointerEvent::Up);

        assert!(editor.handle(PointerEvent::Down(Point::new(30.0, 30.0))));
        assert!(editor.bbox().is_none());
        editor.handle(PointerEvent::Move(Point::new(40.0, 45.0)));
        editor.handle(PointerEvent::Up);

        let bbox = editor.bbox().unwrap();
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (30.0, 30.0, 10.0, 15.0));
    }

    #[test]
    fn test_final_box_matches_last_move() {
        let mut editor = enabled_editor();
        let moves = [
            Point::new(12.0, 7.0),
            Point::new(3.5, 90.0),
            Point::new(-4.0, 60.25),
        ];
        editor.handle(PointerEvent::Down(Point::new(10.0, 10.0)));
        for p in moves {
            editor.handle(PointerEvent::Move(p));
        }
        editor.handle(PointerEvent::Up);

        let expected = BoundingBox::from_drag(Point::new(10.0, 10.0), Point::new(-4.0, 60.25));
        assert_eq!(editor.bbox(), Some(expected));
    }

    #[test]
    fn test_reset_from_drawing() {
        let mut editor = enabled_editor();
        editor.handle(PointerEvent::Down(Point::new(1.0, 1.0)));
        editor.handle(PointerEvent::Move(Point::new(2.0, 2.0)));
        editor.reset();

        assert_eq!(editor.state(), EditorState::Idle);
        assert!(editor.bbox().is_none());
    }

    #[test]
    fn test_disabled_editor_ignores_input() {
        let mut editor = BoxEditor::new();
        assert!(!editor.handle(PointerEvent::Down(Point::new(1.0, 1.0))));
        assert!(!editor.handle(PointerEvent::Move(Point::new(9.0, 9.0))));
        assert_eq!(editor.state(), EditorState::Idle);
        assert!(editor.bbox().is_none());
    }
}
