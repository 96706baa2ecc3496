//! # Events Module
//!
//! Decoding of object-storage notifications delivered through the queue.

pub mod errors;
pub mod notification;
pub mod parser;

pub use errors::ParseError;
pub use notification::TriggerRecord;
pub use parser::{is_probe_event, parse};
