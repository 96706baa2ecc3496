//! # Queue Client Trait
//!
//! The narrow interface the consumer needs from the queue service.

use std::time::Duration;

use async_trait::async_trait;

use super::errors::QueueResult;
use super::types::{QueueMessage, ReceiptHandle};

/// Provider-agnostic queue access
///
/// Implementations own their connection details (queue url, region); the
/// consumer only asks for messages and deletes the ones it is done with.
/// Delivery semantics, visibility timeouts and redrive policies belong to the
/// provider.
#[async_trait]
pub trait QueueClient: Send + Sync + 'static {
    /// Long-poll for up to `max_messages`, waiting at most `wait` for availability
    ///
    /// An empty vector is a normal outcome, not an error.
    async fn receive(&self, max_messages: i32, wait: Duration) -> QueueResult<Vec<QueueMessage>>;

    /// Delete one delivery of a message
    async fn delete(&self, receipt_handle: &ReceiptHandle) -> QueueResult<()>;

    /// Queue identifier for logging (url or name)
    fn queue_name(&self) -> &str;

    /// Provider name for logging (e.g. "sqs", "in_memory")
    fn provider_name(&self) -> &'static str;
}
