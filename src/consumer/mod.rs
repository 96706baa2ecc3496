//! # Consumer Module
//!
//! The at-least-once notification consumer: per-message processing and the
//! poll loop that drives it.

pub mod bootstrap;
pub mod message_processor;
pub mod poll_loop;

#[cfg(feature = "aws")]
pub use bootstrap::bootstrap;
pub use bootstrap::build_poll_loop;
pub use message_processor::{
    MessageDisposition, MessageProcessor, ProcessingReport, RecordOutcome,
};
pub use poll_loop::{PollLoop, PollLoopConfig, PollOutcome, PollStats};
