// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region export and import.
//!
//! This module writes the current selection in YAML or JSON format,
//! chosen by file extension.

use crate::models::region::RegionData;
use anyhow::{bail, Result};
use std::path::Path;

/// Export region data to YAML format.
pub fn export_yaml(data: &RegionData, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export region data to JSON format.
pub fn export_json(data: &RegionData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Export using the format implied by the file extension.
pub fn export_region(data: &RegionData, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(data, path),
        Some("json") => export_json(data, path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}

/// Import region data previously written by `export_region`.
///
/// The box must be finite and lie on the recorded frame.
pub fn import_region(path: &Path) -> Result<RegionData> {
    let text = std::fs::read_to_string(path)?;
    let region: RegionData = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
        Some("json") => serde_json::from_str(&text)?,
        other => bail!("Unsupported file extension: {:?}", other),
    };
    if !region
        .bbox
        .lies_within(region.frame_width, region.frame_height)
    {
        bail!(
            "Region box lies outside its {}x{} frame",
            region.frame_width,
            region.frame_height
        );
    }
    Ok(region)
}
