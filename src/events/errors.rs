//! Notification parsing errors

use thiserror::Error;

/// Errors decoding a queue message body into trigger records
///
/// Both variants fail the whole message: a record that cannot be decoded is
/// never skipped in favour of its siblings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed message body: {reason}")]
    MalformedBody { reason: String },

    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
}

impl ParseError {
    /// Create a malformed body error
    pub fn malformed_body(reason: impl Into<String>) -> Self {
        Self::MalformedBody {
            reason: reason.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed_record(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::malformed_body(err.to_string())
    }
}
