//! Playlist export jobs: ownership-checked hand-off to a durable queue.

mod amqp;
mod dispatcher;
mod message;
mod publisher;

pub use amqp::AmqpPublisher;
pub use dispatcher::ExportDispatcher;
pub use message::ExportJobMessage;
#[cfg(any(test, feature = "mock"))]
pub use publisher::MockQueuePublisher;
pub use publisher::QueuePublisher;
