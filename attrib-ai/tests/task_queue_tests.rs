//! Integration tests for the single-worker task queue

mod helpers;

use async_trait::async_trait;
use attrib_ai::error::PipelineResult;
use attrib_ai::models::{MetadataRecord, TaskItem};
use attrib_ai::workflow::{AssetProcessor, ProgressSink, QueueSummary, TaskQueue};
use attrib_common::events::{EventBus, MetadataEvent};
use helpers::{orchestrator, write_png, ScriptedBackend};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const CAPTION: &str = "A kitten playing with a ball of yarn";

fn scripted() -> ScriptedBackend {
    ScriptedBackend::new()
        .respond("title", "Playful kitten chasing yarn")
        .respond("description", "kitten playing with yarn, cat, pet care")
        .respond("synonyms", "cat, feline")
}

type Completions = Arc<Mutex<Vec<(usize, String)>>>;

fn recorder() -> (Completions, impl Fn(usize, &str, &MetadataRecord) + Send + Sync + 'static) {
    let completions: Completions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completions);
    (completions, move |index: usize, filename: &str, _record: &MetadataRecord| {
        sink.lock().unwrap().push((index, filename.to_string()));
    })
}

#[tokio::test]
async fn test_failed_item_is_skipped_and_order_kept() {
    let temp_dir = TempDir::new().unwrap();
    let first = write_png(temp_dir.path(), "a.png");
    let missing = temp_dir.path().join("b.png");
    let third = write_png(temp_dir.path(), "c.png");

    let queue = TaskQueue::new(Arc::new(orchestrator(
        Arc::new(scripted()),
        CAPTION,
        Vec::new(),
    )));
    queue.submit(1, first);
    queue.submit(2, missing);
    queue.submit(3, third);

    let (completions, on_complete) = recorder();
    let summary = queue.start(on_complete).unwrap().await.unwrap();

    assert_eq!(summary, QueueSummary { completed: 2, failed: 1 });
    assert_eq!(
        *completions.lock().unwrap(),
        vec![(1, "a.png".to_string()), (3, "c.png".to_string())]
    );

    let results = queue.results().await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].index, 1);
    assert_eq!(results[1].index, 3);
    assert_eq!(results[1].record.category, "Animals");
}

/// Panics on one index, succeeds elsewhere
struct PanicOnIndex(usize);

#[async_trait]
impl AssetProcessor for PanicOnIndex {
    async fn process(
        &self,
        item: &TaskItem,
        _progress: Option<&ProgressSink>,
    ) -> PipelineResult<MetadataRecord> {
        if item.index == self.0 {
            panic!("asset {} exploded", item.index);
        }
        Ok(MetadataRecord::new(item.path.display().to_string()))
    }
}

#[tokio::test]
async fn test_panicking_item_does_not_stop_worker() {
    let queue = TaskQueue::new(Arc::new(PanicOnIndex(2)));
    queue.submit(1, "one.png");
    queue.submit(2, "two.png");
    queue.submit(3, "three.png");

    let (completions, on_complete) = recorder();
    let summary = queue.start(on_complete).unwrap().await.unwrap();

    assert_eq!(summary, QueueSummary { completed: 2, failed: 1 });
    let indices: Vec<usize> = completions.lock().unwrap().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![1, 3]);
}

/// Tracks how many assets are inside `process` at once
struct Gauge {
    inner: Box<dyn AssetProcessor>,
    current: AtomicUsize,
    max: AtomicUsize,
}

#[async_trait]
impl AssetProcessor for Gauge {
    async fn process(
        &self,
        item: &TaskItem,
        progress: Option<&ProgressSink>,
    ) -> PipelineResult<MetadataRecord> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
        let result = self.inner.process(item, progress).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[tokio::test]
async fn test_one_asset_at_a_time() {
    let temp_dir = TempDir::new().unwrap();
    let backend = Arc::new(
        scripted()
            .delay("title", Duration::from_millis(50))
            .delay("description", Duration::from_millis(50))
            .delay("synonyms", Duration::from_millis(50)),
    );
    let gauge = Arc::new(Gauge {
        inner: Box::new(orchestrator(Arc::clone(&backend), CAPTION, Vec::new())),
        current: AtomicUsize::new(0),
        max: AtomicUsize::new(0),
    });

    let queue = TaskQueue::new(gauge.clone());
    for index in 1..=3 {
        queue.submit(index, write_png(temp_dir.path(), &format!("{}.png", index)));
    }
    let summary = queue.start(|_, _, _| {}).unwrap().await.unwrap();

    assert_eq!(summary.completed, 3);
    assert_eq!(gauge.max.load(Ordering::SeqCst), 1);
    assert!(backend.max_in_flight() <= 3);
}

#[tokio::test]
async fn test_events_published_per_asset() {
    let temp_dir = TempDir::new().unwrap();
    let bus = EventBus::new(1024);
    let mut events = bus.subscribe();

    let queue = TaskQueue::new(Arc::new(orchestrator(
        Arc::new(scripted()),
        CAPTION,
        Vec::new(),
    )))
    .with_events(bus);
    queue.submit(1, write_png(temp_dir.path(), "a.png"));
    queue.submit(2, temp_dir.path().join("missing.png"));

    queue.start(|_, _, _| {}).unwrap().await.unwrap();

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    let completed_at = received
        .iter()
        .position(|e| matches!(e, MetadataEvent::AssetCompleted { index: 1, .. }))
        .expect("asset 1 completed");
    let field_events: Vec<usize> = received
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, MetadataEvent::FieldUpdated { index: 1, .. }))
        .map(|(i, _)| i)
        .collect();
    assert!(!field_events.is_empty());
    assert!(field_events.iter().all(|&i| i < completed_at));

    assert!(received.iter().any(|e| matches!(
        e,
        MetadataEvent::AssetFailed { index: 2, .. }
    )));
    match received.last() {
        Some(MetadataEvent::QueueDrained {
            batch_id,
            completed,
            failed,
            ..
        }) => {
            assert_eq!(*batch_id, queue.batch_id());
            assert_eq!(*completed, 1);
            assert_eq!(*failed, 1);
        }
        other => panic!("expected QueueDrained last, got {:?}", other),
    }
}
