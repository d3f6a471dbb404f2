//! Caption provider client
//!
//! Captioning (vision model inference) happens in an external command. The
//! image path is passed as the last argument and the caption read from stdout.

use super::process::{run_with_timeout, ProcessError};
use async_trait::async_trait;
use attrib_common::config::CaptionerConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Caption provider errors
#[derive(Debug, Error)]
pub enum CaptionError {
    /// Image file not found at path
    #[error("Image not found: {0}")]
    FileNotFound(PathBuf),

    /// Captioner could not run to completion
    #[error("Captioner process error: {0}")]
    Process(#[from] ProcessError),

    /// Captioner ran but reported failure
    #[error("Captioner failed with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Produces a raw scene description for one image or frame
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    async fn caption(&self, image: &Path) -> Result<String, CaptionError>;
}

/// Caption provider backed by a configured command
#[derive(Debug, Clone)]
pub struct CommandCaptionProvider {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandCaptionProvider {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &CaptionerConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone(), config.timeout())
    }
}

#[async_trait]
impl CaptionProvider for CommandCaptionProvider {
    async fn caption(&self, image: &Path) -> Result<String, CaptionError> {
        if !image.exists() {
            return Err(CaptionError::FileNotFound(image.to_path_buf()));
        }

        let mut command = Command::new(&self.command);
        command.args(&self.args).arg(image);

        let output = run_with_timeout(command, None, self.timeout).await?;
        if !output.success() {
            return Err(CaptionError::Failed {
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        // Captioners print one caption; anything after the first line is noise
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string())
    }
}
