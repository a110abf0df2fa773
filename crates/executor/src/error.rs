//! Error types for batch execution.
//!
//! All failures reported by a [`BatchExecutor`](crate::BatchExecutor) or an
//! [`IndexManager`](crate::IndexManager) are represented by the [`Error`] enum.
//! Errors are structured and serializable so that remote executors can ship
//! them across a process boundary without losing detail.
//!
//! # Categories
//!
//! | Category | Variants | Description |
//! |----------|----------|-------------|
//! | Connectivity | `Unavailable` | Store cannot be reached |
//! | Execution | `StatementFailed`, `ConstraintViolation` | A statement in the batch failed |
//! | Input | `InvalidParameter` | A statement was malformed |
//! | Results | `Decode` | Rows did not have the expected shape |

use serde::{Deserialize, Serialize};

/// Batch execution errors.
///
/// A batch is applied best-effort and in order: when a statement fails, the
/// statements before it stay applied and the ones after it never run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    /// The store could not be reached
    #[error("graph store unavailable: {reason}")]
    Unavailable { reason: String },

    /// A statement in the batch failed
    #[error("statement {index} failed: {reason}")]
    StatementFailed { index: usize, reason: String },

    /// A declared uniqueness constraint would be violated
    #[error("constraint violation: {label}.{property} = '{value}' already exists")]
    ConstraintViolation {
        label: String,
        property: String,
        value: String,
    },

    /// A statement parameter was rejected
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    /// Result rows could not be decoded into the requested shape
    #[error("decode error: {reason}")]
    Decode { reason: String },
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode {
            reason: e.to_string(),
        }
    }
}
