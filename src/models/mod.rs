// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: videos, boxes and exported regions.

pub mod annotation;
pub mod region;
pub mod video;
