use super::message::ExportJobMessage;
use super::publisher::QueuePublisher;
use crate::metrics;
use crate::playlist::{OwnershipGate, PlaylistError};
use std::sync::Arc;
use tracing::{info, warn};

/// Re-validates ownership, then hands export jobs to the queue publisher.
pub struct ExportDispatcher {
    gate: OwnershipGate,
    publisher: Arc<dyn QueuePublisher>,
    queue: String,
}

impl ExportDispatcher {
    pub fn new<T: Into<String>>(
        gate: OwnershipGate,
        publisher: Arc<dyn QueuePublisher>,
        queue: T,
    ) -> Self {
        Self {
            gate,
            publisher,
            queue: queue.into(),
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Publishes `message` unchanged once `caller_id` is confirmed as the
    /// owner of `playlist_id`. Nothing is published when the check fails.
    pub async fn send_export_job(
        &self,
        playlist_id: &str,
        caller_id: &str,
        message: &[u8],
    ) -> Result<(), PlaylistError> {
        if let Err(e) = self.gate.verify_owner(playlist_id, caller_id) {
            metrics::record_export_job("rejected");
            return Err(e);
        }

        if let Err(e) = self.publisher.publish(&self.queue, message).await {
            warn!("Failed to enqueue export of {} on {}: {:#}", playlist_id, self.queue, e);
            metrics::record_export_job("failed");
            return Err(PlaylistError::Broker(e));
        }

        metrics::record_export_job("accepted");
        info!("Enqueued export of {} on {}", playlist_id, self.queue);
        Ok(())
    }

    pub async fn request_export(
        &self,
        playlist_id: &str,
        caller_id: &str,
        target_email: &str,
    ) -> Result<(), PlaylistError> {
        let message = ExportJobMessage {
            user_id: caller_id.to_string(),
            playlist_id: playlist_id.to_string(),
            target_email: target_email.to_string(),
        };
        let bytes = message.to_bytes()?;
        self.send_export_job(playlist_id, caller_id, &bytes).await
    }
}
