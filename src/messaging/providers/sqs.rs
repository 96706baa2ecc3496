//! # SQS Queue Client
//!
//! `QueueClient` backed by Amazon SQS long polling.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::{Message, MessageSystemAttributeName};
use tracing::{debug, warn};

use crate::messaging::errors::{QueueError, QueueResult};
use crate::messaging::traits::QueueClient;
use crate::messaging::types::{QueueMessage, ReceiptHandle};

/// SQS caps long polling at 20 seconds
const MAX_WAIT_SECONDS: u64 = 20;

/// SQS-backed queue client
#[derive(Debug, Clone)]
pub struct SqsQueueClient {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsQueueClient {
    /// Create a client for one queue url
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Create from a loaded AWS SDK configuration
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, queue_url: impl Into<String>) -> Self {
        Self::new(aws_sdk_sqs::Client::new(sdk_config), queue_url)
    }
}

/// Convert an SQS delivery, `None` when it carries no receipt handle
fn to_queue_message(message: &Message) -> Option<QueueMessage> {
    let receipt_handle = message.receipt_handle()?;
    let id = message.message_id().unwrap_or("unknown");

    let mut converted = QueueMessage::new(id, message.body().map(str::to_string), receipt_handle);

    let receive_count = message
        .attributes()
        .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
        .and_then(|count| count.parse::<u32>().ok());
    if let Some(count) = receive_count {
        converted = converted.with_receive_count(count);
    }

    Some(converted)
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn receive(&self, max_messages: i32, wait: Duration) -> QueueResult<Vec<QueueMessage>> {
        let wait_seconds = wait.as_secs().min(MAX_WAIT_SECONDS) as i32;

        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .send()
            .await
            .map_err(|e| {
                QueueError::receive(&self.queue_url, DisplayErrorContext(&e).to_string())
            })?;

        let mut messages = Vec::with_capacity(output.messages().len());
        for message in output.messages() {
            match to_queue_message(message) {
                Some(converted) => messages.push(converted),
                // Without a receipt handle the delivery cannot be deleted; it will
                // come back after its visibility timeout.
                None => warn!(
                    queue = %self.queue_url,
                    message_id = message.message_id().unwrap_or("unknown"),
                    "Dropping SQS delivery without a receipt handle"
                ),
            }
        }

        debug!(
            queue = %self.queue_url,
            count = messages.len(),
            "Received SQS messages"
        );
        Ok(messages)
    }

    async fn delete(&self, receipt_handle: &ReceiptHandle) -> QueueResult<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle.as_str())
            .send()
            .await
            .map_err(|e| {
                QueueError::delete(
                    &self.queue_url,
                    receipt_handle.as_str(),
                    DisplayErrorContext(&e).to_string(),
                )
            })?;
        Ok(())
    }

    fn queue_name(&self) -> &str {
        &self.queue_url
    }

    fn provider_name(&self) -> &'static str {
        "sqs"
    }
}
