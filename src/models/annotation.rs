// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the region of interest drawn on a video's first
//! frame and the integer form it takes when sent for tracking.

use serde::{Deserialize, Serialize};

/// A 2D point in media pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box anchored at the drag start point.
///
/// `width` and `height` keep the sign of the drag direction; a box drawn
/// up and to the left has negative extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Integer box as transmitted to the tracking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalBox {
    pub x: i64,
    pub y: i64,
    pub width: u64,
    pub height: u64,
}

impl BoundingBox {
    /// Box spanning from `anchor` to `current`, without normalizing direction.
    pub fn from_drag(anchor: Point, current: Point) -> Self {
        Self {
            x: anchor.x,
            y: anchor.y,
            width: current.x - anchor.x,
            height: current.y - anchor.y,
        }
    }

    /// True if the drag went left or up from the anchor.
    pub fn is_reversed(&self) -> bool {
        self.width < 0.0 || self.height < 0.0
    }

    /// Top-left and bottom-right corners of the area the box covers on screen.
    pub fn corners(&self) -> (Point, Point) {
        let (x0, x1) = ordered(self.x, self.x + self.width);
        let (y0, y1) = ordered(self.y, self.y + self.height);
        (Point::new(x0, y0), Point::new(x1, y1))
    }

    /// True if every field is finite and the box lies on a `width` x `height` frame.
    pub fn lies_within(&self, width: u32, height: u32) -> bool {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return false;
        }
        let (tl, br) = self.corners();
        tl.x >= 0.0 && tl.y >= 0.0 && br.x <= width as f64 && br.y <= height as f64
    }

    /// Integer form for submission.
    ///
    /// The origin stays at the anchor; the extents become magnitudes. For a
    /// reversed drag this is a different area than `corners` describes.
    pub fn canonical(&self) -> CanonicalBox {
        CanonicalBox {
            x: round_half_up(self.x) as i64,
            y: round_half_up(self.y) as i64,
            width: round_half_up(self.width.abs()) as u64,
            height: round_half_up(self.height.abs()) as u64,
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Rounds .5 toward positive infinity.
fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}
