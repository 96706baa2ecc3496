//! # Messaging Error Types
//!
//! Structured errors for queue receive/delete operations using thiserror
//! instead of `Box<dyn Error>` patterns.

use thiserror::Error;

/// Queue operation errors
///
/// A `Receive` failure is a poll-level fault handled by the poll loop with a
/// fixed backoff. A `Delete` failure is only ever logged: the disposition was
/// already decided and the message will simply be redelivered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue receive failed: {queue}: {message}")]
    Receive { queue: String, message: String },

    #[error("Queue delete failed: {queue}: receipt {receipt_handle}: {message}")]
    Delete {
        queue: String,
        receipt_handle: String,
        message: String,
    },
}

impl QueueError {
    /// Create a receive error
    pub fn receive(queue: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Receive {
            queue: queue.into(),
            message: message.into(),
        }
    }

    /// Create a delete error
    pub fn delete(
        queue: impl Into<String>,
        receipt_handle: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Delete {
            queue: queue.into(),
            receipt_handle: receipt_handle.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_error_creation() {
        let err = QueueError::receive("transcode-queue", "connection reset");
        assert!(matches!(err, QueueError::Receive { .. }));

        let err = QueueError::delete("transcode-queue", "rh-1", "expired");
        assert!(matches!(err, QueueError::Delete { .. }));
    }

    #[test]
    fn test_queue_error_display() {
        let err = QueueError::delete("transcode-queue", "rh-1", "receipt handle expired");
        let display_str = format!("{err}");
        assert!(display_str.contains("Queue delete failed"));
        assert!(display_str.contains("transcode-queue"));
        assert!(display_str.contains("rh-1"));
        assert!(display_str.contains("receipt handle expired"));
    }
}
