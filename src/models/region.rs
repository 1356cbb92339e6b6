// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Exportable snapshot of the current selection.

use super::annotation::{BoundingBox, CanonicalBox};
use super::video::VideoItem;
use serde::{Deserialize, Serialize};

/// Region of interest together with the video it was drawn on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionData {
    pub video_id: String,
    pub video_name: String,
    pub media_file: String,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Box as drawn, extents signed.
    pub bbox: BoundingBox,
    /// Box as it would be submitted.
    pub submitted: CanonicalBox,
}

impl RegionData {
    pub fn new(video: &VideoItem, frame_size: (u32, u32), bbox: BoundingBox) -> Self {
        Self {
            video_id: video.id.clone(),
            video_name: video.display_name.clone(),
            media_file: video.source_location.clone(),
            frame_width: frame_size.0,
            frame_height: frame_size.1,
            bbox,
            submitted: bbox.canonical(),
        }
    }
}
