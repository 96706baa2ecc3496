//! # Messaging Module
//!
//! Queue access for the notification consumer: the provider-agnostic
//! [`QueueClient`] seam, the message types it yields, and its providers
//! (SQS for production, in-memory for tests and local runs).

pub mod errors;
pub mod providers;
pub mod traits;
pub mod types;

pub use errors::{QueueError, QueueResult};
pub use providers::InMemoryQueueClient;
#[cfg(feature = "aws")]
pub use providers::SqsQueueClient;
pub use traits::QueueClient;
pub use types::{MessageId, QueueMessage, ReceiptHandle};
