// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tracked video results.
//!
//! A result lives as a file in a session temporary directory. Presenting a
//! new result, or releasing the current one, deletes the previous file.

use crate::error::{Error, Result};
use crate::remote::pipeline::TrackingOutput;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Local, playable copy of a tracking result.
#[derive(Debug)]
pub struct ResultHandle {
    path: PathBuf,
    media_type: &'static str,
    size: usize,
    pub frames_processed: Option<u64>,
    pub resolution: Option<String>,
    pub fps: Option<f64>,
}

impl ResultHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for ResultHandle {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Released result {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}

/// Exclusive owner of the current result handle.
#[derive(Debug)]
pub struct ResultPresenter {
    // Declared first so the handle is dropped before its directory
    current: Option<ResultHandle>,
    session_dir: TempDir,
    counter: u64,
}

impl ResultPresenter {
    pub fn new() -> Result<Self> {
        let session_dir = tempfile::Builder::new().prefix("visiotrack-").tempdir()?;
        log::debug!("Result directory {}", session_dir.path().display());
        Ok(Self {
            current: None,
            session_dir,
            counter: 0,
        })
    }

    /// Release the previous result and publish `output` as the new one.
    pub fn present(&mut self, output: TrackingOutput) -> Result<&ResultHandle> {
        self.release();

        self.counter += 1;
        let path = self
            .session_dir
            .path()
            .join(format!("result-{}.mp4", self.counter));
        std::fs::write(&path, &output.bytes)?;
        log::info!("Result written to {} ({} bytes)", path.display(), output.bytes.len());

        Ok(self.current.insert(ResultHandle {
            path,
            media_type: output.media_type,
            size: output.bytes.len(),
            frames_processed: output.frames_processed,
            resolution: output.resolution,
            fps: output.fps,
        }))
    }

    pub fn handle(&self) -> Option<&ResultHandle> {
        self.current.as_ref()
    }

    /// Drop the current result, deleting its file.
    pub fn release(&mut self) {
        self.current = None;
    }

    /// Copy the current result to `dest`.
    pub fn download_to(&self, dest: &Path) -> Result<()> {
        let handle = self
            .current
            .as_ref()
            .ok_or_else(|| Error::Playback("No result to download".to_string()))?;
        std::fs::copy(&handle.path, dest)?;
        log::info!("Saved result to {}", dest.display());
        Ok(())
    }

    /// Open the current result in the system media player.
    ///
    /// A failure here is a playback problem only; the handle stays usable.
    pub fn open_in_player(&self) -> Result<()> {
        let handle = self
            .current
            .as_ref()
            .ok_or_else(|| Error::Playback("No result to play".to_string()))?;
        let status = player_command(&handle.path)
            .status()
            .map_err(|e| Error::Playback(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::Playback(format!("Player exited with {}", status)))
        }
    }
}

/// File name offered when saving a result for `video_name`.
pub fn suggested_file_name(video_name: &str) -> String {
    let stem = Path::new(video_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "video".to_string());
    format!("tracked_{}.mp4", stem)
}

fn player_command(path: &Path) -> Command {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    command.arg(path);
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn output(bytes: &[u8]) -> TrackingOutput {
        TrackingOutput {
            bytes: bytes.to_vec(),
            media_type: "video/mp4",
            frames_processed: Some(3),
            resolution: None,
            fps: None,
        }
    }

    #[test]
    fn test_present_replaces_previous_handle() {
        let mut presenter = ResultPresenter::new().unwrap();
        let first = presenter.present(output(b"first")).unwrap().path().to_path_buf();
        assert!(first.exists());

        let second = presenter.present(output(b"second")).unwrap().path().to_path_buf();
        assert!(!first.exists());
        assert_eq!(std::fs::read(&second).unwrap(), b"second");

        let handle = presenter.handle().unwrap();
        assert_eq!(handle.media_type(), "video/mp4");
        assert_eq!(handle.size(), 6);
        assert_eq!(handle.frames_processed, Some(3));
    }

    #[test]
    fn test_release_deletes_file() {
        let mut presenter = ResultPresenter::new().unwrap();
        let path = presenter.present(output(b"x")).unwrap().path().to_path_buf();
        presenter.release();
        assert!(presenter.handle().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_download_copies_result() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("tracked_cat.mp4");
        let mut presenter = ResultPresenter::new().unwrap();

        assert!(presenter.download_to(&dest).is_err());
        presenter.present(output(b"tracked")).unwrap();
        presenter.download_to(&dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"tracked");

        // The handle survives a download
        assert!(presenter.handle().unwrap().path().exists());
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(suggested_file_name("Test Cat Video"), "tracked_Test Cat Video.mp4");
        assert_eq!(suggested_file_name("clip.mov"), "tracked_clip.mp4");
        assert_eq!(suggested_file_name(""), "tracked_video.mp4");
    }
}
