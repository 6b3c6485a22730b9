use super::publisher::QueuePublisher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use std::time::Duration;
use tracing::{debug, warn};

const PERSISTENT_DELIVERY_MODE: u8 = 2;

/// [`QueuePublisher`] over AMQP 0.9.1.
///
/// Each publish opens its own connection and closes it before returning, no
/// matter how the publish went.
pub struct AmqpPublisher {
    amqp_url: String,
    confirm_timeout: Duration,
}

impl AmqpPublisher {
    pub fn new<T: Into<String>>(amqp_url: T, confirm_timeout: Duration) -> Self {
        Self {
            amqp_url: amqp_url.into(),
            confirm_timeout,
        }
    }

    async fn publish_on(&self, channel: &Channel, queue: &str, payload: &[u8]) -> Result<()> {
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .context("Failed to enable publisher confirms")?;

        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .with_context(|| format!("Failed to declare queue {}", queue))?;

        let confirm = channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    .with_delivery_mode(PERSISTENT_DELIVERY_MODE),
            )
            .await
            .with_context(|| format!("Failed to publish to queue {}", queue))?;

        // The message is handed off at this point; the confirmation is only
        // waited for so the connection is not torn down under it.
        match tokio::time::timeout(self.confirm_timeout, confirm).await {
            Ok(Ok(Confirmation::Ack(_))) => debug!("Broker confirmed message on {}", queue),
            Ok(Ok(confirmation)) => {
                warn!("Broker did not ack message on {}: {:?}", queue, confirmation)
            }
            Ok(Err(e)) => warn!("Failed to receive confirmation on {}: {}", queue, e),
            Err(_) => warn!(
                "No confirmation on {} within {}ms",
                queue,
                self.confirm_timeout.as_millis()
            ),
        }
        Ok(())
    }
}

#[async_trait]
impl QueuePublisher for AmqpPublisher {
    async fn publish(&self, queue: &str, payload: &[u8]) -> Result<()> {
        let connection = Connection::connect(&self.amqp_url, ConnectionProperties::default())
            .await
            .context("Failed to connect to message broker")?;

        let result = match connection.create_channel().await {
            Ok(channel) => self.publish_on(&channel, queue, payload).await,
            Err(e) => Err(anyhow::Error::new(e).context("Failed to open broker channel")),
        };

        if let Err(e) = connection.close(200, "OK").await {
            warn!("Failed to close broker connection: {}", e);
        }
        result
    }
}
