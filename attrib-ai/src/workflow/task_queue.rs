//! Single-worker task queue
//!
//! The text backend is one shared, stateful resource, so whole assets are
//! processed strictly one after another. Inside an asset the orchestrator
//! still runs its three generators concurrently.
//!
//! Error isolation: a failing or panicking asset is logged and skipped; the
//! worker moves on to the next item.

use super::event_bridge::spawn_event_bridge;
use super::orchestrator::AssetProcessor;
use super::progress::ProgressSink;
use crate::error::PipelineError;
use crate::models::{MetadataRecord, TaskItem};
use attrib_common::events::{EventBus, MetadataEvent};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A finalized asset, in completion order
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedAsset {
    pub index: usize,
    pub filename: String,
    pub record: MetadataRecord,
}

/// Outcome counts for one worker run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub completed: usize,
    pub failed: usize,
}

/// FIFO of submitted assets drained by one worker
pub struct TaskQueue {
    processor: Arc<dyn AssetProcessor>,
    pending: Arc<Mutex<VecDeque<TaskItem>>>,
    results: Arc<RwLock<Vec<CompletedAsset>>>,
    running: Arc<AtomicBool>,
    events: Option<EventBus>,
    batch_id: Uuid,
}

impl TaskQueue {
    pub fn new(processor: Arc<dyn AssetProcessor>) -> Self {
        Self {
            processor,
            pending: Arc::new(Mutex::new(VecDeque::new())),
            results: Arc::new(RwLock::new(Vec::new())),
            running: Arc::new(AtomicBool::new(false)),
            events: None,
            batch_id: Uuid::new_v4(),
        }
    }

    /// Publish progress and completion events on `bus`
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Identifier stamped on every event from this queue
    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    /// Queue an asset; picked up by the current or next worker run
    pub fn submit(&self, index: usize, path: impl Into<PathBuf>) {
        let item = TaskItem::new(index, path);
        debug!(index, file = %item.path.display(), "Asset queued");
        lock(&self.pending).push_back(item);
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Snapshot of completed assets
    pub async fn results(&self) -> Vec<CompletedAsset> {
        self.results.read().await.clone()
    }

    /// Start the worker
    ///
    /// `on_complete(index, filename, record)` fires once per finalized asset.
    /// Returns `None` without side effects if a worker is already running;
    /// otherwise the handle resolves when the queue has drained.
    pub fn start<F>(&self, on_complete: F) -> Option<JoinHandle<QueueSummary>>
    where
        F: Fn(usize, &str, &MetadataRecord) + Send + Sync + 'static,
    {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Task queue worker already running");
            return None;
        }

        let worker = Worker {
            processor: Arc::clone(&self.processor),
            pending: Arc::clone(&self.pending),
            results: Arc::clone(&self.results),
            running: Arc::clone(&self.running),
            events: self.events.clone(),
            batch_id: self.batch_id,
        };
        Some(tokio::spawn(worker.run(on_complete)))
    }
}

fn lock(pending: &Mutex<VecDeque<TaskItem>>) -> std::sync::MutexGuard<'_, VecDeque<TaskItem>> {
    // Queue contents stay consistent even if a holder panicked
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Worker {
    processor: Arc<dyn AssetProcessor>,
    pending: Arc<Mutex<VecDeque<TaskItem>>>,
    results: Arc<RwLock<Vec<CompletedAsset>>>,
    running: Arc<AtomicBool>,
    events: Option<EventBus>,
    batch_id: Uuid,
}

impl Worker {
    async fn run<F>(self, on_complete: F) -> QueueSummary
    where
        F: Fn(usize, &str, &MetadataRecord) + Send + Sync + 'static,
    {
        info!(batch_id = %self.batch_id, "Task queue worker started");
        let mut summary = QueueSummary::default();

        loop {
            let next = lock(&self.pending).pop_front();
            let Some(item) = next else {
                self.running.store(false, Ordering::SeqCst);
                // A submit may have landed between the pop and the store
                let reclaimed = !lock(&self.pending).is_empty()
                    && self
                        .running
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok();
                if reclaimed {
                    continue;
                }
                break;
            };

            self.process_item(item, &on_complete, &mut summary).await;
        }

        info!(
            batch_id = %self.batch_id,
            completed = summary.completed,
            failed = summary.failed,
            "Task queue drained"
        );
        if let Some(bus) = &self.events {
            bus.emit_lossy(MetadataEvent::QueueDrained {
                batch_id: self.batch_id,
                completed: summary.completed,
                failed: summary.failed,
                timestamp: chrono::Utc::now(),
            });
        }
        summary
    }

    async fn process_item<F>(&self, item: TaskItem, on_complete: &F, summary: &mut QueueSummary)
    where
        F: Fn(usize, &str, &MetadataRecord),
    {
        let started = Instant::now();
        let filename = item.filename();
        info!(index = item.index, file = %item.path.display(), "Processing asset");

        let (progress, bridge) = match &self.events {
            Some(bus) => {
                let (sink, rx) = ProgressSink::channel();
                let bridge = spawn_event_bridge(rx, bus.clone(), self.batch_id, item.index);
                (Some(sink), Some(bridge))
            }
            None => (None, None),
        };

        // Own task so a panic surfaces as a JoinError instead of killing the worker
        let processor = Arc::clone(&self.processor);
        let task_item = item.clone();
        let outcome = tokio::spawn(async move {
            processor.process(&task_item, progress.as_ref()).await
        })
        .await
        .unwrap_or_else(|e| Err(PipelineError::TaskFailed(e.to_string())));

        // Field events are flushed before the completion event
        if let Some(bridge) = bridge {
            let _ = bridge.await;
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(record) => {
                self.results.write().await.push(CompletedAsset {
                    index: item.index,
                    filename: filename.clone(),
                    record: record.clone(),
                });
                if let Some(bus) = &self.events {
                    bus.emit_lossy(MetadataEvent::AssetCompleted {
                        batch_id: self.batch_id,
                        index: item.index,
                        filename: filename.clone(),
                        keyword_count: record.keywords.len(),
                        category: record.category.clone(),
                        duration_ms,
                        timestamp: chrono::Utc::now(),
                    });
                }
                info!(
                    index = item.index,
                    file = %filename,
                    keywords = record.keywords.len(),
                    category = %record.category,
                    duration_ms,
                    "Asset completed"
                );
                on_complete(item.index, &filename, &record);
                summary.completed += 1;
            }
            Err(e) => {
                match &e {
                    PipelineError::UnsupportedMedia(_) => {
                        warn!(index = item.index, "Skipping {}: {}", filename, e)
                    }
                    _ => error!(index = item.index, "Asset {} failed: {}", filename, e),
                }
                if let Some(bus) = &self.events {
                    bus.emit_lossy(MetadataEvent::AssetFailed {
                        batch_id: self.batch_id,
                        index: item.index,
                        filename,
                        error: e.to_string(),
                        timestamp: chrono::Utc::now(),
                    });
                }
                summary.failed += 1;
            }
        }
    }
}
