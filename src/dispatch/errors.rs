//! Job dispatch errors

use thiserror::Error;

/// A job launch that did not produce a running job
///
/// The consumer does not distinguish retryable from permanent rejections:
/// every variant forces the owning message to be retained and redelivered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The platform answered but refused to start the job (capacity, quota, missing resources)
    #[error("Job launch rejected: {reason}")]
    Rejected { reason: String },

    /// The request never got a usable answer (network, throttling, service fault)
    #[error("Job launch request failed: {message}")]
    Transport { message: String },

    /// The job spec could not be turned into a platform request
    #[error("Invalid job spec: {message}")]
    InvalidSpec { message: String },
}

impl DispatchError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            message: message.into(),
        }
    }
}
