//! Forwards per-field progress into the shared EventBus

use super::progress::FieldUpdate;
use attrib_common::events::{EventBus, MetadataEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Publish every update from `rx` as `MetadataEvent::FieldUpdated`
///
/// The task ends once every sender is dropped and returns the number of
/// updates forwarded.
pub fn spawn_event_bridge(
    mut rx: mpsc::UnboundedReceiver<FieldUpdate>,
    bus: EventBus,
    batch_id: Uuid,
    index: usize,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut forwarded = 0;
        while let Some(update) = rx.recv().await {
            bus.emit_lossy(MetadataEvent::FieldUpdated {
                batch_id,
                index,
                field: update.field.to_string(),
                value: update.value,
                timestamp: chrono::Utc::now(),
            });
            forwarded += 1;
        }
        tracing::debug!(index, forwarded, "Event bridge closed");
        forwarded
    })
}
