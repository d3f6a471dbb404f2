//! attrib-ai - stock metadata generator
//!
//! Scans an input directory for images and videos, generates title,
//! description, keywords and category for each one through a local text
//! backend, and writes the records to `results.json`.

use anyhow::{Context, Result};
use attrib_ai::datasets::Datasets;
use attrib_ai::generators::{GeneratorContext, PromptTemplates};
use attrib_ai::services::{
    BackendGateway, CommandCaptionProvider, FfmpegFrameExtractor, FileScanner, OllamaCliBackend,
};
use attrib_ai::workflow::{MetadataOrchestrator, TaskQueue};
use attrib_common::events::{EventBus, MetadataEvent};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

/// Command-line arguments for attrib-ai
#[derive(Parser, Debug)]
#[command(name = "attrib-ai")]
#[command(about = "Generate stock-site metadata for images and videos")]
#[command(version)]
struct Args {
    /// Directory containing images and videos
    input_dir: PathBuf,

    /// Config file (overrides ATTRIB_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the JSON results
    #[arg(short, long, default_value = "results.json")]
    output: PathBuf,

    /// Backend model (overrides config and ATTRIB_BACKEND_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = attrib_common::config::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(model) = args.model {
        config.backend.model = model;
    }
    attrib_common::logging::init_tracing(&config.logging)
        .context("Failed to initialize logging")?;

    info!("Starting attrib-ai v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {} run {}", config.backend.command, config.backend.model);

    let datasets = Datasets::load(&config.datasets).context("Failed to load datasets")?;
    let prompts = PromptTemplates::load_or_default(config.prompts_file.as_deref())
        .context("Failed to load prompt templates")?;

    let gateway = BackendGateway::new(
        Arc::new(OllamaCliBackend::from_config(&config.backend)),
        config.backend.model.clone(),
        config.backend.timeout(),
    );
    let ctx = GeneratorContext::new(
        gateway,
        Arc::new(prompts),
        Arc::new(datasets),
        Arc::new(config.pipeline.clone()),
    );
    let orchestrator = MetadataOrchestrator::new(
        ctx,
        Arc::new(CommandCaptionProvider::from_config(&config.captioner)),
        Arc::new(FfmpegFrameExtractor::from_config(&config.frames)),
    )
    .with_frame_count(config.frames.count)
    .with_timeouts(config.captioner.timeout(), config.frames.timeout());

    let files = FileScanner::new()
        .recursive(args.recursive)
        .scan(&args.input_dir)
        .with_context(|| format!("Failed to scan {}", args.input_dir.display()))?;
    if files.is_empty() {
        info!("No media files found in {}", args.input_dir.display());
    }

    let event_bus = EventBus::new(256);
    let mut events = event_bus.subscribe();
    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(MetadataEvent::FieldUpdated {
                    index, field, value, ..
                }) => debug!(index, field = %field, "{}", value),
                Ok(MetadataEvent::QueueDrained { .. }) | Err(RecvError::Closed) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!("Progress log skipped {} events", skipped),
            }
        }
    });

    let queue = TaskQueue::new(Arc::new(orchestrator)).with_events(event_bus);
    for (index, path) in files.iter().enumerate() {
        queue.submit(index + 1, path.clone());
    }

    let total = files.len();
    let worker = queue
        .start(move |index, filename, record| {
            println!(
                "[{}/{}] {} -> {} ({} keywords)",
                index,
                total,
                filename,
                record.category,
                record.keywords.len()
            );
        })
        .context("Task queue worker already running")?;

    let summary = worker.await.context("Task queue worker aborted")?;
    let _ = event_logger.await;

    let records: Vec<_> = queue
        .results()
        .await
        .into_iter()
        .map(|completed| completed.record)
        .collect();
    let json = serde_json::to_string_pretty(&records).context("Failed to serialize results")?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        "Done: {} completed, {} failed, results in {}",
        summary.completed,
        summary.failed,
        args.output.display()
    );
    Ok(())
}
