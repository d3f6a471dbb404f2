//! Video frame extraction via ffprobe + ffmpeg
//!
//! Frames are sampled evenly: for `count` frames the timestamps are
//! `duration * i / (count + 1)` for `i` in `1..=count`, so the first and last
//! instants (often black) are never used.

use super::process::{run_with_timeout, ProcessError};
use async_trait::async_trait;
use attrib_common::config::FrameConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Frame extraction errors
#[derive(Debug, Error)]
pub enum FrameError {
    /// Video file not found at path
    #[error("Video not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Frame tool process error: {0}")]
    Process(#[from] ProcessError),

    /// ffprobe ran but could not report a usable duration
    #[error("Failed to probe duration of {path}: {reason}")]
    ProbeFailed { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces still frames for a video asset (possibly none)
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    async fn extract_frames(&self, video: &Path, count: usize) -> Result<Vec<PathBuf>, FrameError>;
}

/// Sampling instants for `count` evenly spaced frames
pub fn frame_timestamps(duration_secs: f64, count: usize) -> Vec<f64> {
    if duration_secs <= 0.0 || count == 0 {
        return Vec::new();
    }
    (1..=count)
        .map(|i| duration_secs * i as f64 / (count + 1) as f64)
        .collect()
}

/// Frame extractor shelling out to ffprobe/ffmpeg
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    ffmpeg: String,
    ffprobe: String,
    cache_dir: PathBuf,
    timeout: Duration,
}

impl FfmpegFrameExtractor {
    pub fn from_config(config: &FrameConfig) -> Self {
        Self {
            ffmpeg: config.ffmpeg.clone(),
            ffprobe: config.ffprobe.clone(),
            cache_dir: config.cache_dir.clone(),
            timeout: config.timeout(),
        }
    }

    /// Container duration in seconds
    async fn probe_duration(&self, video: &Path) -> Result<f64, FrameError> {
        let mut command = Command::new(&self.ffprobe);
        command
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(video);

        let output = run_with_timeout(command, None, self.timeout).await?;
        if !output.success() {
            return Err(FrameError::ProbeFailed {
                path: video.to_path_buf(),
                reason: output.stderr.trim().to_string(),
            });
        }

        output
            .stdout
            .trim()
            .parse::<f64>()
            .map_err(|e| FrameError::ProbeFailed {
                path: video.to_path_buf(),
                reason: format!("unparseable duration '{}': {}", output.stdout.trim(), e),
            })
    }

    async fn grab_frame(&self, video: &Path, at_secs: f64, target: &Path) -> Result<bool, FrameError> {
        let mut command = Command::new(&self.ffmpeg);
        command
            .arg("-y")
            .arg("-ss")
            .arg(format!("{:.3}", at_secs))
            .arg("-i")
            .arg(video)
            .args(["-frames:v", "1", "-q:v", "2"])
            .arg(target);

        let output = run_with_timeout(command, None, self.timeout).await?;
        Ok(output.success() && target.exists())
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract_frames(&self, video: &Path, count: usize) -> Result<Vec<PathBuf>, FrameError> {
        if !video.exists() {
            return Err(FrameError::FileNotFound(video.to_path_buf()));
        }

        let duration = self.probe_duration(video).await?;
        let timestamps = frame_timestamps(duration, count);
        if timestamps.is_empty() {
            debug!("No frames to extract from {} (duration {})", video.display(), duration);
            return Ok(Vec::new());
        }

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());

        let mut frames = Vec::with_capacity(timestamps.len());
        for (idx, at_secs) in timestamps.into_iter().enumerate() {
            let target = self.cache_dir.join(format!("{}_frame_{}.jpg", stem, idx + 1));
            match self.grab_frame(video, at_secs, &target).await {
                Ok(true) => frames.push(target),
                Ok(false) => warn!("ffmpeg produced no frame {} for {}", idx + 1, video.display()),
                // One bad frame does not spoil the others
                Err(e) => warn!("Frame {} extraction failed for {}: {}", idx + 1, video.display(), e),
            }
        }
        Ok(frames)
    }
}
