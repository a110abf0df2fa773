//! Error types for the instrument service.
//!
//! | Category | Variant | Transport mapping |
//! |----------|---------|-------------------|
//! | Client | `InvalidRequest` | 4xx |
//! | Store | `Executor` | 5xx, propagated verbatim from the executor |
//! | System | `Serialization`, `Config` | 5xx |
//!
//! Not-found is never an error: reads return `None` and deletes return
//! `false`.

use finstrument_executor::Error as ExecutorError;

/// Service errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The caller sent a malformed or ambiguous request
    #[error("invalid request")]
    InvalidRequest {
        /// What was wrong with the request
        details: String,
    },

    /// The batch executor failed; the store may hold partial results of the
    /// batch
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// A record could not be serialized
    #[error("serialization error: {reason}")]
    Serialization {
        /// Serializer message
        reason: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {reason}")]
    Config {
        /// What failed to load or validate
        reason: String,
    },
}

impl Error {
    /// Create an `InvalidRequest` error
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Error::InvalidRequest {
            details: details.into(),
        }
    }

    /// Human-readable detail of an `InvalidRequest`
    pub fn invalid_request_details(&self) -> Option<&str> {
        match self {
            Error::InvalidRequest { details } => Some(details.as_str()),
            _ => None,
        }
    }

    /// True if the caller, not the service, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidRequest { .. })
    }
}

impl From<finstrument_core::Error> for Error {
    fn from(e: finstrument_core::Error) -> Self {
        match e {
            finstrument_core::Error::InvalidPayload { reason } => {
                Error::InvalidRequest { details: reason }
            }
            finstrument_core::Error::Serialization { reason } => Error::Serialization { reason },
        }
    }
}
