//! Progressive field updates

use crate::models::MetadataField;
use tokio::sync::mpsc;

/// One field of a record became available
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub field: MetadataField,
    pub value: String,
}

/// Sending half of a per-asset progress channel
///
/// Reporting never blocks and never fails: once the receiver is gone,
/// updates are dropped.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: mpsc::UnboundedSender<FieldUpdate>,
}

impl ProgressSink {
    pub fn new(tx: mpsc::UnboundedSender<FieldUpdate>) -> Self {
        Self { tx }
    }

    /// New sink plus the receiver that observes it
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FieldUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn report(&self, field: MetadataField, value: impl Into<String>) {
        let _ = self.tx.send(FieldUpdate {
            field,
            value: value.into(),
        });
    }
}
