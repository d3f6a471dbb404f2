//! attrib-ai library interface
//!
//! Turns a raw scene caption for an image or video into stock-site metadata:
//! a paraphrased title, a length-capped description, a bounded keyword set
//! and a taxonomy category.
//!
//! # Layout
//! - `datasets` - Read-only taxonomy, calendar and synonym tables
//! - `services` - Adapters for external processes (text backend, captioner, ffmpeg, file scanning)
//! - `generators` - Title, description and keyword generators plus response parsing
//! - `enrichment` - Calendar enrichment and category classification
//! - `workflow` - Per-asset orchestrator, event bridge and the single-worker task queue
//! - `models` - MetadataRecord and TaskItem

pub mod datasets;
pub mod enrichment;
pub mod error;
pub mod generators;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{PipelineError, PipelineResult};
