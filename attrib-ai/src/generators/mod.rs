//! Field generators (title, description, keywords)
//!
//! Each generator builds a prompt from the caption, calls the backend through
//! the [`BackendGateway`](crate::services::BackendGateway) and post-processes
//! free-form text into a bounded structural result. Generators never fail:
//! every error path ends in a documented fallback value.

pub mod description;
pub mod keywords;
pub mod prompts;
pub mod response_parser;
pub mod title;
pub mod vocabulary;

pub use description::generate_description;
pub use keywords::{generate_keywords, prune_near_duplicates};
pub use prompts::PromptTemplates;
pub use title::generate_title;

use crate::datasets::Datasets;
use crate::services::BackendGateway;
use attrib_common::config::PipelineConfig;
use std::sync::Arc;

/// Everything a generator needs, cheap to clone into spawned tasks
#[derive(Clone)]
pub struct GeneratorContext {
    pub gateway: BackendGateway,
    pub prompts: Arc<PromptTemplates>,
    pub datasets: Arc<Datasets>,
    pub pipeline: Arc<PipelineConfig>,
}

impl GeneratorContext {
    pub fn new(
        gateway: BackendGateway,
        prompts: Arc<PromptTemplates>,
        datasets: Arc<Datasets>,
        pipeline: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            gateway,
            prompts,
            datasets,
            pipeline,
        }
    }
}
