//! Queue provider implementations

mod in_memory;
#[cfg(feature = "aws")]
mod sqs;

pub use in_memory::InMemoryQueueClient;
#[cfg(feature = "aws")]
pub use sqs::SqsQueueClient;
