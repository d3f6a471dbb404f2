//! Per-asset orchestration and the single-worker task queue

pub mod event_bridge;
pub mod orchestrator;
pub mod progress;
pub mod task_queue;

pub use orchestrator::{AssetProcessor, MetadataOrchestrator};
pub use progress::{FieldUpdate, ProgressSink};
pub use task_queue::{CompletedAsset, QueueSummary, TaskQueue};
