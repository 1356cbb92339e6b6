// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the VisioTrack application.

pub mod banner;
pub mod canvas;
pub mod result_panel;
pub mod toolbar;
pub mod video_list;
