// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module maps pointer positions on the displayed frame back into
//! the media pixel space of the underlying video.

use crate::models::annotation::Point;

/// On-screen rectangle a frame is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Convert a client-space pointer position into media pixel coordinates.
///
/// Each axis is scaled by `intrinsic / displayed`. Returns `None` while the
/// surface has no displayed area.
pub fn client_to_media(client: Point, surface: ScreenRect, intrinsic: (u32, u32)) -> Option<Point> {
    if surface.width <= 0.0 || surface.height <= 0.0 {
        return None;
    }
    let scale_x = intrinsic.0 as f64 / surface.width;
    let scale_y = intrinsic.1 as f64 / surface.height;
    Some(Point {
        x: (client.x - surface.left) * scale_x,
        y: (client.y - surface.top) * scale_y,
    })
}

/// Largest size with the frame's aspect ratio that fits in `available`.
pub fn fit_size(intrinsic: (u32, u32), available: (f64, f64)) -> (f64, f64) {
    let (w, h) = (intrinsic.0 as f64, intrinsic.1 as f64);
    if w * available.1 > available.0 * h {
        // Frame is wider - fit to width
        (available.0, available.0 * h / w)
    } else {
        // Frame is taller - fit to height
        (available.1 * w / h, available.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displayed_edges_map_to_frame_extremes() {
        let surface = ScreenRect::new(37.5, 112.25, 640.0, 360.0);
        let intrinsic = (1920, 1080);

        let tl = client_to_media(Point::new(37.5, 112.25), surface, intrinsic).unwrap();
        assert_eq!(tl.x, 0.0);
        assert_eq!(tl.y, 0.0);

        let br = client_to_media(Point::new(677.5, 472.25), surface, intrinsic).unwrap();
        assert_eq!(br.x, 1920.0);
        assert_eq!(br.y, 1080.0);
    }

    #[test]
    fn test_axes_scale_independently() {
        let surface = ScreenRect::new(0.0, 0.0, 200.0, 400.0);
        let p = client_to_media(Point::new(100.0, 100.0), surface, (400, 400)).unwrap();
        assert_eq!(p, Point::new(200.0, 100.0));
    }

    #[test]
    fn test_interior_point_is_proportional() {
        let surface = ScreenRect::new(10.0, 20.0, 800.0, 450.0);
        let p = client_to_media(Point::new(210.0, 132.5), surface, (1280, 720)).unwrap();
        assert!((p.x - 320.0).abs() < 1e-9);
        assert!((p.y - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sized_surface() {
        let surface = ScreenRect::new(0.0, 0.0, 0.0, 100.0);
        assert!(client_to_media(Point::new(1.0, 1.0), surface, (100, 100)).is_none());
    }

    #[test]
    fn test_fit_size() {
        assert_eq!(fit_size((1920, 1080), (960.0, 960.0)), (960.0, 540.0));
        assert_eq!(fit_size((1080, 1920), (960.0, 960.0)), (540.0, 960.0));
    }
}
