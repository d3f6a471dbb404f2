//! Queued unit of work

use std::path::{Path, PathBuf};

/// Image extensions accepted by the pipeline
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Video extensions accepted by the pipeline
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Media type, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

impl MediaKind {
    /// Classify a path by its (case-insensitive) extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some(e) if IMAGE_EXTENSIONS.contains(&e) => MediaKind::Image,
            Some(e) if VIDEO_EXTENSIONS.contains(&e) => MediaKind::Video,
            _ => MediaKind::Unsupported,
        }
    }
}

/// (sequence index, asset path) consumed exactly once by the queue worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub index: usize,
    pub path: PathBuf,
}

impl TaskItem {
    pub fn new(index: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }

    /// File name component, falling back to the full path
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn media_kind(&self) -> MediaKind {
        MediaKind::from_path(&self.path)
    }
}
