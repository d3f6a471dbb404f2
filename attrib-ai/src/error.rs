//! Error types for attrib-ai
//!
//! Only `PipelineError` ever reaches the task queue; backend, caption and parse
//! failures are recovered where they happen and degrade a single field.

use std::path::PathBuf;
use thiserror::Error;

/// Per-asset processing error
#[derive(Debug, Error)]
pub enum PipelineError {
    /// File extension is neither a supported image nor video type
    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(PathBuf),

    /// Asset file missing or unreadable
    #[error("Asset not found: {0}")]
    AssetNotFound(PathBuf),

    /// A pipeline task panicked or was cancelled
    #[error("Pipeline task failed: {0}")]
    TaskFailed(String),
}

/// Result type for per-asset processing
pub type PipelineResult<T> = Result<T, PipelineError>;
