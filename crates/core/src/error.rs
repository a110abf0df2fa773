//! Error types for core record handling
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for record encoding and decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Serialization of a record to its canonical form failed
    #[error("serialization error: {reason}")]
    Serialization {
        /// What went wrong
        reason: String,
    },

    /// An incoming payload could not be decoded into a record
    #[error("invalid payload: {reason}")]
    InvalidPayload {
        /// What went wrong
        reason: String,
    },
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}
