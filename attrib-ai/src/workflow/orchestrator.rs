//! Metadata orchestrator
//!
//! Per asset:
//! 1. Caption the image (or each extracted video frame)
//! 2. Generate title, description and keywords as three concurrent tasks
//! 3. Enrich description and keywords from the calendar
//! 4. Classify the enriched keywords
//!
//! A failed or panicking generator is replaced by its fallback value; one bad
//! field never costs the asset its record. When a [`ProgressSink`] is given,
//! each field is reported as soon as it is known. Category is always reported
//! after keywords.

use super::progress::ProgressSink;
use crate::enrichment::{
    classify, enrich_description, enrich_keywords, extract_themes, find_related_entries,
};
use crate::error::{PipelineError, PipelineResult};
use crate::generators::description::fallback_description;
use crate::generators::keywords::fallback_keywords;
use crate::generators::{generate_description, generate_keywords, generate_title, GeneratorContext};
use crate::models::metadata_record::FLAG_VIDEO;
use crate::models::{MediaKind, MetadataField, MetadataRecord, TaskItem};
use crate::services::process::run_bounded;
use crate::services::{CaptionProvider, FrameExtractor};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Turns one queued asset into a metadata record
#[async_trait]
pub trait AssetProcessor: Send + Sync {
    async fn process(
        &self,
        item: &TaskItem,
        progress: Option<&ProgressSink>,
    ) -> PipelineResult<MetadataRecord>;
}

/// Coordinates captioning, generation, enrichment and classification
pub struct MetadataOrchestrator {
    ctx: GeneratorContext,
    captioner: Arc<dyn CaptionProvider>,
    frame_extractor: Arc<dyn FrameExtractor>,
    frame_count: usize,
    caption_timeout: Duration,
    frame_timeout: Duration,
}

impl MetadataOrchestrator {
    pub fn new(
        ctx: GeneratorContext,
        captioner: Arc<dyn CaptionProvider>,
        frame_extractor: Arc<dyn FrameExtractor>,
    ) -> Self {
        Self {
            ctx,
            captioner,
            frame_extractor,
            frame_count: 1,
            caption_timeout: Duration::from_secs(60),
            frame_timeout: Duration::from_secs(60),
        }
    }

    /// Frames sampled per video (at least one)
    pub fn with_frame_count(mut self, count: usize) -> Self {
        self.frame_count = count.max(1);
        self
    }

    pub fn with_timeouts(mut self, caption_timeout: Duration, frame_timeout: Duration) -> Self {
        self.caption_timeout = caption_timeout;
        self.frame_timeout = frame_timeout;
        self
    }

    /// Caption for one image or frame ("" on any failure)
    async fn caption(&self, image: &Path) -> String {
        let captioner = Arc::clone(&self.captioner);
        let image = image.to_path_buf();
        run_bounded("Captioning", self.caption_timeout, async move {
            captioner.caption(&image).await
        })
        .await
        .map(|caption| caption.trim().to_string())
        .unwrap_or_default()
    }

    /// Image pipeline: caption, generate, flag as still image
    pub async fn process_image(&self, path: &Path, progress: Option<&ProgressSink>) -> MetadataRecord {
        let caption = self.caption(path).await;
        if caption.is_empty() {
            warn!("No caption for {}, metadata will be degraded", path.display());
        } else if let Some(sink) = progress {
            sink.report(MetadataField::Captions, caption.clone());
        }

        let mut record = self.compose(path, &caption, progress).await;
        if !caption.is_empty() {
            record.captions.push(caption);
        }
        record.flags.insert(FLAG_VIDEO.to_string(), false);
        if let Some(sink) = progress {
            sink.report(MetadataField::Flags, record.flags_display());
        }
        record
    }

    /// Video pipeline: extract frames, caption each, first caption drives generation
    pub async fn process_video(&self, path: &Path, progress: Option<&ProgressSink>) -> MetadataRecord {
        let extractor = Arc::clone(&self.frame_extractor);
        let video = path.to_path_buf();
        let count = self.frame_count;
        // Probe plus one ffmpeg call per frame, each individually bounded
        let budget = self.frame_timeout * (count as u32 + 1);
        let frames = run_bounded("Frame extraction", budget, async move {
            extractor.extract_frames(&video, count).await
        })
        .await
        .unwrap_or_default();

        if frames.is_empty() {
            warn!("No frames extracted from {}, metadata will be degraded", path.display());
        }

        let mut captions = Vec::with_capacity(frames.len());
        for frame in &frames {
            let caption = self.caption(frame).await;
            if !caption.is_empty() {
                captions.push(caption);
            }
        }
        if let Some(sink) = progress {
            if !captions.is_empty() {
                sink.report(MetadataField::Captions, captions.join("; "));
            }
        }

        let caption = captions.first().cloned().unwrap_or_default();
        let mut record = self.compose(path, &caption, progress).await;
        record.captions = captions;
        record.flags.insert(FLAG_VIDEO.to_string(), true);
        if let Some(sink) = progress {
            sink.report(MetadataField::Flags, record.flags_display());
        }
        record
    }

    /// Generate, enrich and classify a record from one caption
    pub async fn compose(
        &self,
        asset: &Path,
        caption: &str,
        progress: Option<&ProgressSink>,
    ) -> MetadataRecord {
        let pipeline = Arc::clone(&self.ctx.pipeline);
        let datasets = Arc::clone(&self.ctx.datasets);

        let title_task = {
            let ctx = self.ctx.clone();
            let caption = caption.to_string();
            let progress = progress.cloned();
            tokio::spawn(async move {
                let title = generate_title(&ctx, &caption).await;
                if let Some(sink) = &progress {
                    sink.report(MetadataField::Title, title.clone());
                }
                title
            })
        };

        let description_task = {
            let ctx = self.ctx.clone();
            let caption = caption.to_string();
            let progress = progress.cloned();
            tokio::spawn(async move {
                let description = generate_description(&ctx, &caption).await;
                if let Some(sink) = &progress {
                    sink.report(MetadataField::Description, description.clone());
                }
                description
            })
        };

        let keywords_task = {
            let ctx = self.ctx.clone();
            let caption = caption.to_string();
            let progress = progress.cloned();
            tokio::spawn(async move {
                let keywords = generate_keywords(&ctx, &caption, None).await;
                if let Some(sink) = &progress {
                    sink.report(MetadataField::Keywords, keywords.join(", "));
                }
                keywords
            })
        };

        let (title, description, keywords) =
            tokio::join!(title_task, description_task, keywords_task);

        let title = title.unwrap_or_else(|e| {
            warn!("Title generation aborted for {}: {}", asset.display(), e);
            let fallback = caption.trim().to_string();
            report(progress, MetadataField::Title, &fallback);
            fallback
        });
        let description = description.unwrap_or_else(|e| {
            warn!("Description generation aborted for {}: {}", asset.display(), e);
            let fallback = fallback_description(caption, pipeline.max_description_len);
            report(progress, MetadataField::Description, &fallback);
            fallback
        });
        let keywords = keywords.unwrap_or_else(|e| {
            warn!("Keyword generation aborted for {}: {}", asset.display(), e);
            let fallback = fallback_keywords(caption, &pipeline);
            report(progress, MetadataField::Keywords, &fallback.join(", "));
            fallback
        });

        let themes = extract_themes(&description);
        let observances = find_related_entries(&datasets.calendar, &themes);
        debug!(
            themes = themes.len(),
            observances = observances.len(),
            "Calendar matches for {}",
            asset.display()
        );

        let enriched_description =
            enrich_description(&description, &observances, pipeline.max_description_len);
        if enriched_description != description {
            report(progress, MetadataField::Description, &enriched_description);
        }
        let enriched_keywords = enrich_keywords(&keywords, &observances, pipeline.max_keywords);
        if enriched_keywords != keywords {
            report(progress, MetadataField::Keywords, &enriched_keywords.join(", "));
        }

        let (category, secondary_category) = classify(&enriched_keywords, &datasets.taxonomy);
        report(progress, MetadataField::Category, &category);

        let mut record = MetadataRecord::new(asset.display().to_string());
        record.title = title;
        record.description = enriched_description;
        record.keywords = enriched_keywords;
        record.category = category;
        record.secondary_category = secondary_category;
        record
    }
}

fn report(progress: Option<&ProgressSink>, field: MetadataField, value: &str) {
    if let Some(sink) = progress {
        sink.report(field, value);
    }
}

#[async_trait]
impl AssetProcessor for MetadataOrchestrator {
    async fn process(
        &self,
        item: &TaskItem,
        progress: Option<&ProgressSink>,
    ) -> PipelineResult<MetadataRecord> {
        if !item.path.exists() {
            return Err(PipelineError::AssetNotFound(item.path.clone()));
        }

        match item.media_kind() {
            MediaKind::Image => Ok(self.process_image(&item.path, progress).await),
            MediaKind::Video => Ok(self.process_video(&item.path, progress).await),
            MediaKind::Unsupported => Err(PipelineError::UnsupportedMedia(item.path.clone())),
        }
    }
}
