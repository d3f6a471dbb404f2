//! Media file scanner
//!
//! Discovers images and videos under an input directory. Candidates are
//! selected by extension, then confirmed by magic bytes (`infer`) so that a
//! renamed text file never reaches the captioner.

use crate::models::MediaKind;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Media file scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Cannot read file header
    #[error("File access error {0}: {1}")]
    FileAccessError(PathBuf, String),
}

/// Media file scanner
pub struct FileScanner {
    ignore_patterns: Vec<String>,
    recursive: bool,
}

impl FileScanner {
    /// Scanner for the top level of a directory, ignoring system files
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".cache".to_string(),
            ],
            recursive: false,
        }
    }

    /// Descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Scan a directory for media files, sorted by path
    pub fn scan(&self, root_path: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }
        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        let mut symlink_visited = HashSet::new();
        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .max_depth(if self.recursive { usize::MAX } else { 1 })
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, &mut symlink_visited));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            match self.is_media_file(entry.path()) {
                Ok(true) => files.push(entry.path().to_path_buf()),
                Ok(false) => {
                    tracing::debug!("Skipping non-media file {}", entry.path().display())
                }
                Err(e) => tracing::warn!("Error verifying {}: {}", entry.path().display(), e),
            }
        }

        files.sort();
        tracing::debug!("Scan of {} found {} media files", root_path.display(), files.len());
        Ok(files)
    }

    fn should_process_entry(&self, entry: &DirEntry, symlink_visited: &mut HashSet<PathBuf>) -> bool {
        // Root is always walked, even when its name matches an ignore pattern
        if entry.depth() == 0 {
            return true;
        }

        let file_name = entry.file_name().to_string_lossy();
        if self
            .ignore_patterns
            .iter()
            .any(|pattern| file_name.contains(pattern.as_str()))
        {
            return false;
        }

        if entry.file_type().is_symlink() {
            if let Ok(canonical) = entry.path().canonicalize() {
                if !symlink_visited.insert(canonical) {
                    tracing::warn!("Symlink loop detected: {}", entry.path().display());
                    return false;
                }
            }
        }

        true
    }

    /// Extension first (fast), then magic bytes must agree on image vs video
    fn is_media_file(&self, path: &Path) -> Result<bool, ScanError> {
        let expected = match MediaKind::from_path(path) {
            MediaKind::Unsupported => return Ok(false),
            MediaKind::Image => infer::MatcherType::Image,
            MediaKind::Video => infer::MatcherType::Video,
        };

        let detected = infer::get_from_path(path)
            .map_err(|e| ScanError::FileAccessError(path.to_path_buf(), e.to_string()))?;

        Ok(matches!(detected, Some(kind) if kind.matcher_type() == expected))
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 1];

    #[test]
    fn test_scan_nonexistent_path() {
        let scanner = FileScanner::new();
        match scanner.scan(Path::new("/nonexistent/path")) {
            Err(ScanError::PathNotFound(_)) => {}
            other => panic!("Expected PathNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_file_as_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.png");
        fs::write(&file, PNG_HEADER).unwrap();

        assert!(matches!(
            FileScanner::new().scan(&file),
            Err(ScanError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_scan_confirms_magic_bytes_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.png"), PNG_HEADER).unwrap();
        fs::write(temp_dir.path().join("a.jpg"), JPEG_HEADER).unwrap();
        fs::write(temp_dir.path().join("renamed.jpg"), b"just some text").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"hello").unwrap();

        let files = FileScanner::new().scan(temp_dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_recursive_flag_controls_depth() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join("top.png"), PNG_HEADER).unwrap();
        fs::write(nested.join("deep.png"), PNG_HEADER).unwrap();

        assert_eq!(FileScanner::new().scan(temp_dir.path()).unwrap().len(), 1);
        assert_eq!(
            FileScanner::new()
                .recursive(true)
                .scan(temp_dir.path())
                .unwrap()
                .len(),
            2
        );
    }
}
