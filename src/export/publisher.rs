use anyhow::Result;
use async_trait::async_trait;

/// Hands opaque message bytes to a named durable queue.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    /// Returns once the message has been handed to the broker client.
    /// Delivery to a consumer is not awaited.
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<()>;
}
