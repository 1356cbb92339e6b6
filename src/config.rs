// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted settings and the remote endpoint configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Endpoint baked in at build time, if any.
pub const BUILD_DEFAULT_ENDPOINT: Option<&str> = option_env!("VISIOTRACK_API_URL");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Base URL of the tracking service.
    #[serde(rename = "visiotrack_api_url", default)]
    pub api_url: String,
    /// Directory or http(s) base URL holding the built-in samples.
    #[serde(default = "default_samples_location")]
    pub samples_location: String,
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
}

fn default_samples_location() -> String {
    "test-videos".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            samples_location: default_samples_location(),
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

/// Get the path to the settings file.
pub fn settings_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "visiotrack")
        .map(|dirs| dirs.config_dir().join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("settings.json"))
}

/// Load settings from `path`, or return defaults if missing or unreadable.
pub fn load_settings(path: &Path) -> AppSettings {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Failed to parse settings: {}, using defaults", e);
                AppSettings::default()
            }
        },
        Err(_) => AppSettings::default(),
    }
}

/// Save settings to `path`, creating its directory if needed.
pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Remote service base URL.
///
/// Owned by the application and passed by reference to whatever needs to
/// read it; `set` is the only writer.
#[derive(Debug)]
pub struct EndpointConfig {
    url: String,
    settings_path: Option<PathBuf>,
}

impl EndpointConfig {
    /// Configuration backed by the settings file at `path`.
    ///
    /// A build-time default wins over the persisted value.
    pub fn load(path: impl Into<PathBuf>, build_default: Option<&str>) -> Self {
        let path = path.into();
        let persisted = load_settings(&path).api_url;
        let url = match build_default.map(clean_url) {
            Some(url) if !url.is_empty() => url,
            _ => clean_url(&persisted),
        };
        log::info!("Endpoint configured as {:?}", url);
        Self {
            url,
            settings_path: Some(path),
        }
    }

    /// Current URL; empty when unset.
    pub fn get(&self) -> &str {
        &self.url
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }

    /// Replace the URL and persist it.
    ///
    /// The new value is visible to `get` even if writing the settings file
    /// fails; the write error is still returned.
    pub fn set(&mut self, url: &str) -> Result<()> {
        self.url = clean_url(url);
        log::info!("Endpoint set to {:?}", self.url);

        if let Some(path) = &self.settings_path {
            let mut settings = load_settings(path);
            settings.api_url = self.url.clone();
            save_settings(path, &settings)?;
        }
        Ok(())
    }
}

/// Trim whitespace and one trailing '/'.
fn clean_url(url: &str) -> String {
    let trimmed = url.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_strips_trailing_slash() {
        let dir = tempdir().unwrap();
        let mut config = EndpointConfig::load(dir.path().join("settings.json"), None);
        assert!(!config.is_configured());
        config.set("https://x.ngrok.io/").unwrap();
        assert_eq!(config.get(), "https://x.ngrok.io");
        config.set("  https://y.ngrok.io  ").unwrap();
        assert_eq!(config.get(), "https://y.ngrok.io");
    }

    #[test]
    fn test_persists_across_sessions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut config = EndpointConfig::load(&path, None);
        assert_eq!(config.get(), "");
        config.set("https://x.ngrok.io/").unwrap();

        let reloaded = EndpointConfig::load(&path, None);
        assert_eq!(reloaded.get(), "https://x.ngrok.io");

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"visiotrack_api_url\": \"https://x.ngrok.io\""));
    }

    #[test]
    fn test_build_default_takes_precedence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        EndpointConfig::load(&path, None).set("https://saved.example").unwrap();

        let config = EndpointConfig::load(&path, Some("https://baked.example/"));
        assert_eq!(config.get(), "https://baked.example");

        let config = EndpointConfig::load(&path, Some("   "));
        assert_eq!(config.get(), "https://saved.example");
    }

    #[test]
    fn test_set_keeps_other_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = AppSettings {
            samples_location: "/srv/samples".to_string(),
            ..AppSettings::default()
        };
        save_settings(&path, &settings).unwrap();

        EndpointConfig::load(&path, None).set("https://x.example").unwrap();
        let loaded = load_settings(&path);
        assert_eq!(loaded.samples_location, "/srv/samples");
        assert_eq!(loaded.api_url, "https://x.example");
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), AppSettings::default());
    }
}
