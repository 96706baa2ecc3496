//! # Queue Message Types
//!
//! Provider-agnostic representation of one delivery from the notification queue.

use chrono::{DateTime, Utc};

/// Unique identifier for a queued message
///
/// The format is provider-specific:
/// - SQS: the service-assigned `MessageId`
/// - InMemory: monotonically increasing counter as string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a new message ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Opaque token proving the right to delete one specific delivery of a message
///
/// A redelivered message carries a different receipt handle than its earlier
/// deliveries; only the latest one is guaranteed to be accepted by the queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(pub String);

impl ReceiptHandle {
    /// Create a new receipt handle
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ReceiptHandle {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}

impl From<&str> for ReceiptHandle {
    fn from(handle: &str) -> Self {
        Self(handle.to_string())
    }
}

/// A message received from the notification queue
///
/// Owned by the poll loop for the duration of one processing attempt. The body
/// is kept as raw text; decoding happens in [`crate::events::parse`].
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Provider-assigned message identifier
    pub id: MessageId,

    /// Raw message body, `None` when the provider delivered no body at all
    pub body: Option<String>,

    /// Handle for deleting this delivery
    pub receipt_handle: ReceiptHandle,

    /// Number of times this message has been received, when the provider reports it
    pub receive_count: Option<u32>,

    /// When this delivery was received by the consumer
    pub received_at: DateTime<Utc>,
}

impl QueueMessage {
    /// Create a new queue message received now
    pub fn new(
        id: impl Into<MessageId>,
        body: Option<String>,
        receipt_handle: impl Into<ReceiptHandle>,
    ) -> Self {
        Self {
            id: id.into(),
            body,
            receipt_handle: receipt_handle.into(),
            receive_count: None,
            received_at: Utc::now(),
        }
    }

    /// Set the provider-reported receive count
    pub fn with_receive_count(mut self, receive_count: u32) -> Self {
        self.receive_count = Some(receive_count);
        self
    }

    /// Body as text, empty when absent
    pub fn body_str(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// Milliseconds since this delivery was received, clamped at zero
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms_at(Utc::now())
    }

    fn elapsed_ms_at(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.received_at).num_milliseconds()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_conversions() {
        let id_from_string = MessageId::from("abc-123".to_string());
        assert_eq!(id_from_string.as_str(), "abc-123");
        assert_eq!(MessageId::new("x").to_string(), "x");
    }

    #[test]
    fn test_queue_message_builder() {
        let msg = QueueMessage::new("m-1", Some("{}".to_string()), "rh-1").with_receive_count(3);

        assert_eq!(msg.id.as_str(), "m-1");
        assert_eq!(msg.receipt_handle.as_str(), "rh-1");
        assert_eq!(msg.receive_count, Some(3));
        assert_eq!(msg.body_str(), "{}");
    }

    #[test]
    fn test_elapsed_ms_since_receipt() {
        let msg = QueueMessage::new("m-3", None, "rh-3");
        let later = msg.received_at + chrono::Duration::milliseconds(1250);

        assert_eq!(msg.elapsed_ms_at(later), 1250);
        assert_eq!(msg.elapsed_ms_at(msg.received_at - chrono::Duration::seconds(1)), 0);
    }

    #[test]
    fn test_missing_body_reads_as_empty() {
        let msg = QueueMessage::new("m-2", None, "rh-2");
        assert_eq!(msg.body_str(), "");
        assert!(msg.receive_count.is_none());
    }
}
