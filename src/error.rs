//! Crate-level error type
//!
//! Parse, dispatch and queue errors are handled at the lowest boundary that
//! can decide a message's disposition and never reach this type. Only
//! configuration faults and a broken poll loop travel this far.

use thiserror::Error;

use crate::config::ConfigurationError;

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The poll loop itself broke; the process cannot recover from this
    #[error("Fatal error: {0}")]
    Fatal(String),
}

pub type Result<T> = std::result::Result<T, ConsumerError>;
