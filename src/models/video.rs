// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video catalog: built-in samples plus user uploads.

use std::path::Path;
use std::sync::Arc;

/// Built-in samples as (id, display name).
const SAMPLES: [(&str, &str); 3] = [
    ("test_cat", "Test Cat Video"),
    ("test_car", "Test Car Video"),
    ("test_football", "Test Football Video"),
];

/// Extensions accepted for upload.
const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "webm", "mkv", "avi", "m4v"];

/// A video that can be annotated and submitted.
#[derive(Debug, Clone)]
pub struct VideoItem {
    pub id: String,
    pub display_name: String,
    /// File path or http(s) URL.
    pub source_location: String,
    /// Raw bytes of a user upload. `None` for catalog samples and for
    /// uploads that have been released.
    upload: Option<Arc<[u8]>>,
    user_supplied: bool,
}

impl VideoItem {
    pub fn is_user_supplied(&self) -> bool {
        self.user_supplied
    }

    /// Bytes held for an upload, if still present.
    pub fn upload_bytes(&self) -> Option<Arc<[u8]>> {
        self.upload.clone()
    }
}

/// Ordered list of selectable videos. Samples come first and never change.
#[derive(Debug, Default)]
pub struct VideoCatalog {
    items: Vec<VideoItem>,
}

impl VideoCatalog {
    /// Catalog holding the built-in samples found under `samples_location`.
    pub fn builtin(samples_location: &str) -> Self {
        let items = SAMPLES
            .iter()
            .map(|(id, name)| VideoItem {
                id: id.to_string(),
                display_name: name.to_string(),
                source_location: sample_location(samples_location, id),
                upload: None,
                user_supplied: false,
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[VideoItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&VideoItem> {
        self.items.iter().find(|v| v.id == id)
    }

    /// Append an uploaded video and return its id.
    ///
    /// Returns `None` when the file does not look like a video.
    pub fn add_upload(&mut self, path: &Path, bytes: Vec<u8>) -> Option<String> {
        if !is_video_file(path) {
            log::warn!("Rejected upload of non-video file {}", path.display());
            return None;
        }

        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.mp4".to_string());

        let base_id = format!("uploaded_{}", chrono::Utc::now().timestamp_millis());
        let mut id = base_id.clone();
        let mut suffix = 1;
        while self.get(&id).is_some() {
            id = format!("{}_{}", base_id, suffix);
            suffix += 1;
        }

        log::info!("Added upload {} ({} bytes) as {}", display_name, bytes.len(), id);
        self.items.push(VideoItem {
            id: id.clone(),
            display_name,
            source_location: path.to_string_lossy().to_string(),
            upload: Some(Arc::from(bytes)),
            user_supplied: true,
        });
        Some(id)
    }

    /// Drop every held upload payload. The items stay listed.
    pub fn release_uploads(&mut self) {
        let mut released = 0;
        for item in self.items.iter_mut().filter(|v| v.user_supplied) {
            if item.upload.take().is_some() {
                released += 1;
            }
        }
        if released > 0 {
            log::info!("Released {} uploaded video payload(s)", released);
        }
    }
}

/// True if the path has one of the accepted video extensions.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn sample_location(base: &str, id: &str) -> String {
    if is_remote(base) {
        format!("{}/{}.mp4", base.trim_end_matches('/'), id)
    } else {
        Path::new(base)
            .join(format!("{}.mp4", id))
            .to_string_lossy()
            .to_string()
    }
}

/// True for http(s) locations.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = VideoCatalog::builtin("https://cdn.example/test-videos/");
        assert_eq!(catalog.items().len(), 3);

        let cat = catalog.get("test_cat").unwrap();
        assert_eq!(cat.display_name, "Test Cat Video");
        assert_eq!(cat.source_location, "https://cdn.example/test-videos/test_cat.mp4");
        assert!(!cat.is_user_supplied());
        assert!(cat.upload_bytes().is_none());
    }

    #[test]
    fn test_local_sample_location() {
        let catalog = VideoCatalog::builtin("test-videos");
        let car = catalog.get("test_car").unwrap();
        assert!(Path::new(&car.source_location).ends_with("test-videos/test_car.mp4"));
    }

    #[test]
    fn test_upload_appends_and_releases() {
        let mut catalog = VideoCatalog::builtin("test-videos");
        let id = catalog
            .add_upload(Path::new("/tmp/clip.MP4"), vec![1, 2, 3])
            .unwrap();
        let second = catalog
            .add_upload(Path::new("/tmp/other.webm"), vec![4])
            .unwrap();
        assert_ne!(id, second);
        assert_eq!(catalog.items().len(), 5);

        let item = catalog.get(&id).unwrap();
        assert!(item.is_user_supplied());
        assert_eq!(item.display_name, "clip.MP4");
        assert_eq!(&*item.upload_bytes().unwrap(), &[1, 2, 3]);

        catalog.release_uploads();
        assert!(catalog.get(&id).unwrap().upload_bytes().is_none());
        assert_eq!(catalog.items().len(), 5);
    }

    #[test]
    fn test_upload_rejects_non_video() {
        let mut catalog = VideoCatalog::builtin("test-videos");
        assert!(catalog.add_upload(Path::new("notes.txt"), vec![0]).is_none());
        assert_eq!(catalog.items().len(), 3);
    }
}
