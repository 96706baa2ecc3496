//! # In-Memory Queue Client
//!
//! Thread-safe in-memory queue for testing and local development.
//!
//! ## Features
//!
//! - **Visibility Timeout**: Messages become invisible after receive, re-visible after timeout
//! - **Per-Delivery Receipt Handles**: Every delivery gets a fresh handle; stale handles are rejected
//! - **Receive Counts**: Reported on every delivery, like SQS `ApproximateReceiveCount`
//!
//! Uses `tokio::time::Instant` so paused-clock tests can drive visibility expiry.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::messaging::errors::{QueueError, QueueResult};
use crate::messaging::traits::QueueClient;
use crate::messaging::types::{MessageId, QueueMessage, ReceiptHandle};

/// In-memory message with visibility tracking
#[derive(Debug, Clone)]
struct InMemoryQueuedMessage {
    id: u64,
    body: Option<String>,
    /// When the message becomes visible again (None = visible now)
    visible_at: Option<Instant>,
    /// Handle issued for the most recent delivery
    receipt_handle: Option<ReceiptHandle>,
    receive_count: u32,
}

/// In-memory queue client
///
/// Messages are stored in a `VecDeque` in FIFO order. When nothing is visible,
/// `receive` long-polls: it sleeps until the earliest in-flight message
/// reappears or `wait` elapses, whichever comes first. Messages sent during
/// that sleep are picked up on the next receive.
#[derive(Debug)]
pub struct InMemoryQueueClient {
    name: String,
    visibility_timeout: Duration,
    messages: Mutex<VecDeque<InMemoryQueuedMessage>>,
    next_id: AtomicU64,
    total_deleted: AtomicU64,
}

impl InMemoryQueueClient {
    /// Default visibility timeout, matching the SQS default
    pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new empty queue
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_visibility_timeout(name, Self::DEFAULT_VISIBILITY_TIMEOUT)
    }

    /// Create a new empty queue with a custom visibility timeout
    pub fn with_visibility_timeout(name: impl Into<String>, visibility_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            visibility_timeout,
            messages: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
            total_deleted: AtomicU64::new(0),
        }
    }

    /// Enqueue a message body
    pub fn send(&self, body: impl Into<String>) -> MessageId {
        self.push(Some(body.into()))
    }

    /// Enqueue a message with no body
    pub fn send_empty(&self) -> MessageId {
        self.push(None)
    }

    fn push(&self, body: Option<String>) -> MessageId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.messages.lock().push_back(InMemoryQueuedMessage {
            id,
            body,
            visible_at: None,
            receipt_handle: None,
            receive_count: 0,
        });
        MessageId::new(id.to_string())
    }

    /// Number of messages still in the queue (visible + in flight)
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Whether the queue holds no messages at all
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Number of messages currently invisible to consumers
    pub fn in_flight(&self) -> usize {
        let now = Instant::now();
        self.messages
            .lock()
            .iter()
            .filter(|m| m.visible_at.is_some_and(|vt| vt > now))
            .count()
    }

    /// Total messages deleted through this client
    pub fn total_deleted(&self) -> u64 {
        self.total_deleted.load(Ordering::Relaxed)
    }

    /// Deliver up to `max_messages` visible messages, hiding each for the visibility timeout
    fn take_visible(&self, max_messages: usize) -> Vec<QueueMessage> {
        let now = Instant::now();
        let visible_until = now + self.visibility_timeout;
        let mut received = Vec::new();

        let mut messages = self.messages.lock();
        for msg in messages.iter_mut() {
            if received.len() >= max_messages {
                break;
            }

            if msg.visible_at.is_some_and(|vt| vt > now) {
                continue;
            }

            let handle = ReceiptHandle::new(format!("{}-{}", msg.id, Uuid::new_v4()));
            msg.visible_at = Some(visible_until);
            msg.receipt_handle = Some(handle.clone());
            msg.receive_count += 1;

            received.push(
                QueueMessage::new(msg.id.to_string(), msg.body.clone(), handle)
                    .with_receive_count(msg.receive_count),
            );
        }

        received
    }

    /// Earliest instant an in-flight message becomes visible again
    fn next_visible_at(&self) -> Option<Instant> {
        self.messages.lock().iter().filter_map(|m| m.visible_at).min()
    }
}

#[async_trait]
impl QueueClient for InMemoryQueueClient {
    async fn receive(&self, max_messages: i32, wait: Duration) -> QueueResult<Vec<QueueMessage>> {
        let max_messages = usize::try_from(max_messages).map_err(|_| {
            QueueError::receive(&self.name, format!("invalid max_messages {max_messages}"))
        })?;

        let received = self.take_visible(max_messages);
        if !received.is_empty() {
            return Ok(received);
        }

        if wait.is_zero() {
            tokio::task::yield_now().await;
            return Ok(received);
        }

        let deadline = Instant::now() + wait;
        let wake_at = self
            .next_visible_at()
            .map_or(deadline, |visible_at| visible_at.min(deadline));
        tokio::time::sleep_until(wake_at).await;

        Ok(self.take_visible(max_messages))
    }

    async fn delete(&self, receipt_handle: &ReceiptHandle) -> QueueResult<()> {
        let mut messages = self.messages.lock();
        let position = messages
            .iter()
            .position(|m| m.receipt_handle.as_ref() == Some(receipt_handle));

        match position {
            Some(pos) => {
                messages.remove(pos);
                self.total_deleted.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            None => Err(QueueError::delete(
                &self.name,
                receipt_handle.as_str(),
                "receipt handle does not match a current delivery",
            )),
        }
    }

    fn queue_name(&self) -> &str {
        &self.name
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_receive_hides_message_until_visibility_timeout() {
        let queue = InMemoryQueueClient::with_visibility_timeout("q", Duration::from_secs(30));
        queue.send("hello");

        let first = queue.receive(1, Duration::ZERO).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].body_str(), "hello");
        assert_eq!(first[0].receive_count, Some(1));
        assert_eq!(queue.in_flight(), 1);

        let second = queue.receive(1, Duration::ZERO).await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_redelivery_after_timeout_issues_new_handle() {
        let queue = InMemoryQueueClient::with_visibility_timeout("q", Duration::from_secs(5));
        queue.send("hello");

        let first = queue.receive(1, Duration::ZERO).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        let second = queue.receive(1, Duration::ZERO).await.unwrap();

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].receive_count, Some(2));
        assert_ne!(first[0].receipt_handle, second[0].receipt_handle);

        // The stale handle no longer authorises deletion
        assert!(queue.delete(&first[0].receipt_handle).await.is_err());
        queue.delete(&second[0].receipt_handle).await.unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.total_deleted(), 1);
    }

    #[tokio::test]
    async fn test_receive_respects_max_messages_and_order() {
        let queue = InMemoryQueueClient::new("q");
        queue.send("a");
        queue.send("b");
        queue.send_empty();

        let batch = queue.receive(2, Duration::ZERO).await.unwrap();
        let bodies: Vec<_> = batch.iter().map(|m| m.body_str().to_string()).collect();
        assert_eq!(bodies, vec!["a", "b"]);

        let rest = queue.receive(10, Duration::ZERO).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert!(rest[0].body.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_poll_wakes_when_in_flight_message_reappears() {
        let queue = InMemoryQueueClient::with_visibility_timeout("q", Duration::from_secs(3));
        queue.send("hello");
        queue.receive(1, Duration::ZERO).await.unwrap();

        let started = Instant::now();
        let redelivered = queue.receive(1, Duration::from_secs(10)).await.unwrap();

        assert_eq!(redelivered.len(), 1);
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_poll_on_empty_queue_waits_full_duration() {
        let queue = InMemoryQueueClient::new("q");

        let started = Instant::now();
        let batch = queue.receive(1, Duration::from_secs(10)).await.unwrap();

        assert!(batch.is_empty());
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_unknown_handle_delete_fails() {
        let queue = InMemoryQueueClient::new("q");
        let err = queue
            .delete(&ReceiptHandle::from("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, QueueError::Delete { .. }));
    }
}
