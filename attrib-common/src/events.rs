//! Event types for the Attrib event system
//!
//! Provides the metadata progress events and the broadcast EventBus used to
//! fan them out to any number of listeners (CLI progress printer, tests).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Metadata pipeline events
///
/// Events are broadcast via EventBus and serialize to tagged JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MetadataEvent {
    /// One field of an asset's record became available
    FieldUpdated {
        /// Batch this asset belongs to
        batch_id: Uuid,
        /// Submission index of the asset
        index: usize,
        /// Field name (title, description, keywords, category, captions, flags)
        field: String,
        /// Rendered field value
        value: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Asset record finalized
    AssetCompleted {
        batch_id: Uuid,
        index: usize,
        filename: String,
        keyword_count: usize,
        category: String,
        duration_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Asset skipped after a processing failure
    AssetFailed {
        batch_id: Uuid,
        index: usize,
        filename: String,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Worker drained the queue
    QueueDrained {
        batch_id: Uuid,
        completed: usize,
        failed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl MetadataEvent {
    /// Submission index of the asset this event refers to, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            MetadataEvent::FieldUpdated { index, .. }
            | MetadataEvent::AssetCompleted { index, .. }
            | MetadataEvent::AssetFailed { index, .. } => Some(*index),
            MetadataEvent::QueueDrained { .. } => None,
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally: every subscriber sees every event
/// emitted after it subscribed. Slow subscribers lose the oldest events once
/// `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MetadataEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use attrib_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(256);
    /// assert_eq!(event_bus.capacity(), 256);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<MetadataEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: MetadataEvent,
    ) -> Result<usize, broadcast::error::SendError<MetadataEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Progress events are advisory; nobody listening is not an error.
    pub fn emit_lossy(&self, event: MetadataEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
