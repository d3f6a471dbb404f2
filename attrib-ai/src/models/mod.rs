//! Data models shared across the pipeline

pub mod metadata_record;
pub mod task_item;

pub use metadata_record::{MetadataField, MetadataRecord, UNCATEGORIZED};
pub use task_item::{MediaKind, TaskItem};
