//! Test Helper Utilities
//!
//! Scripted backend, canned caption/frame providers and context builders
//! shared by the attrib-ai integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use attrib_ai::datasets::Datasets;
use attrib_ai::generators::{GeneratorContext, PromptTemplates};
use attrib_ai::services::{
    BackendError, BackendGateway, CaptionError, CaptionProvider, FrameError, FrameExtractor,
    TextBackend,
};
use attrib_ai::workflow::MetadataOrchestrator;
use attrib_common::config::PipelineConfig;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Response that makes the scripted backend panic
pub const PANIC: &str = "!panic";

/// Response that makes the scripted backend return an error
pub const FAIL: &str = "!fail";

/// Prompt templates whose first word identifies the generator
pub fn marker_prompts() -> PromptTemplates {
    PromptTemplates {
        title: "[title] {caption}".to_string(),
        description: "[description] {caption} max={max_len}".to_string(),
        keyword_synonyms: "[synonyms] {terms} | {caption}{context}".to_string(),
        keyword_themes: "[themes] {terms} | {caption}{context}".to_string(),
        keyword_context: "[context] {terms} | {caption}{context}".to_string(),
        keyword_gap_fill: "[gap] count={count} | {caption}".to_string(),
    }
}

/// Backend answering by prompt marker, recording every prompt
#[derive(Default)]
pub struct ScriptedBackend {
    rules: Vec<(String, String)>,
    delays: Vec<(String, Duration)>,
    prompts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer prompts starting with `[marker]` with `response`
    pub fn respond(mut self, marker: &str, response: &str) -> Self {
        self.rules.push((format!("[{}]", marker), response.to_string()));
        self
    }

    /// Sleep before answering prompts starting with `[marker]`
    pub fn delay(mut self, marker: &str, delay: Duration) -> Self {
        self.delays.push((format!("[{}]", marker), delay));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn prompts_with(&self, marker: &str) -> Vec<String> {
        let marker = format!("[{}]", marker);
        self.prompts()
            .into_iter()
            .filter(|p| p.starts_with(&marker))
            .collect()
    }

    /// Highest number of simultaneous generate calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight count even when a call is cancelled
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TextBackend for ScriptedBackend {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some((_, delay)) = self.delays.iter().find(|(m, _)| prompt.starts_with(m)) {
            tokio::time::sleep(*delay).await;
        }
        let response = self
            .rules
            .iter()
            .find(|(m, _)| prompt.starts_with(m))
            .map(|(_, r)| r.clone())
            .unwrap_or_default();

        match response.as_str() {
            PANIC => panic!("scripted backend panic"),
            FAIL => Err(BackendError::NonZeroExit {
                status: "exit status: 1".to_string(),
                stderr: "scripted failure".to_string(),
            }),
            _ => Ok(response),
        }
    }
}

/// Returns the same caption for every existing file
pub struct StaticCaptioner(pub String);

#[async_trait]
impl CaptionProvider for StaticCaptioner {
    async fn caption(&self, image: &Path) -> Result<String, CaptionError> {
        if !image.exists() {
            return Err(CaptionError::FileNotFound(image.to_path_buf()));
        }
        Ok(self.0.clone())
    }
}

/// Returns a fixed frame list for any video
pub struct StaticFrames(pub Vec<PathBuf>);

#[async_trait]
impl FrameExtractor for StaticFrames {
    async fn extract_frames(&self, _video: &Path, count: usize) -> Result<Vec<PathBuf>, FrameError> {
        Ok(self.0.iter().take(count).cloned().collect())
    }
}

/// Generator context over the built-in datasets and marker prompts
pub fn context(backend: Arc<ScriptedBackend>, timeout: Duration) -> GeneratorContext {
    GeneratorContext::new(
        BackendGateway::new(backend, "test-model", timeout),
        Arc::new(marker_prompts()),
        Arc::new(Datasets::builtin()),
        Arc::new(PipelineConfig::default()),
    )
}

/// Orchestrator wired to the scripted backend and canned collaborators
pub fn orchestrator(
    backend: Arc<ScriptedBackend>,
    caption: &str,
    frames: Vec<PathBuf>,
) -> MetadataOrchestrator {
    MetadataOrchestrator::new(
        context(backend, Duration::from_secs(5)),
        Arc::new(StaticCaptioner(caption.to_string())),
        Arc::new(StaticFrames(frames)),
    )
}

/// Unrelated words, pairwise below the near-duplicate threshold
pub const VOCABULARY: &[&str] = &[
    "meadow", "lantern", "harbor", "violin", "pepper", "glacier", "saddle", "orchid",
    "compass", "marble", "thunder", "velvet", "basket", "canyon", "feather", "journey",
    "quartz", "ribbon", "tundra", "walnut", "blossom", "cactus", "dolphin", "engine",
    "falcon", "garlic", "helmet", "island", "jacket", "kettle", "lemon", "mirror", "needle",
    "oyster", "pillow", "quiver", "rocket", "salmon", "tomato", "umbrella", "vortex",
    "window", "yogurt", "zipper", "anchor", "bamboo", "candle", "desert", "emerald", "forest",
    "guitar", "hammock", "igloo", "jungle", "koala", "ladder", "mango", "nectar", "olive",
    "parrot", "quilt", "raven", "sunset", "tulip", "unicorn", "vanilla", "wagon", "xylophone",
    "yacht", "zebra", "acorn", "breeze", "cobalt", "dune", "ember", "fjord", "granite",
    "hazel", "ivory", "jasmine",
];

/// Comma-separated slice of [`VOCABULARY`]
pub fn word_list(skip: usize, count: usize) -> String {
    VOCABULARY
        .iter()
        .skip(skip)
        .take(count)
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write a file carrying a valid PNG header
pub fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(
        &path,
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D],
    )
    .unwrap();
    path
}

/// Write a placeholder file (content irrelevant to the test)
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"placeholder").unwrap();
    path
}
