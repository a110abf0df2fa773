//! Core types for the financial instrument store
//!
//! This crate defines the foundational types used throughout the system:
//! - FinancialInstrument / AlternativeIdentifiers: the entity record
//! - IdEntry: (id, hash) pairs for bulk enumeration
//! - Classification / IdentifierScheme / Relation: graph vocabulary
//! - content_hash: canonical digest of a record
//! - decode_json: streaming payload decoding
//! - Error: core error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decode;
pub mod error;
pub mod hash;
pub mod labels;
pub mod types;

pub use decode::decode_json;
pub use error::{Error, Result};
pub use hash::content_hash;
pub use labels::{
    Classification, IdentifierScheme, Relation, HASH_PROPERTY, IDENTIFIER_LABEL,
    PREF_LABEL_PROPERTY, UUID_PROPERTY, VALUE_PROPERTY,
};
pub use types::{AlternativeIdentifiers, FinancialInstrument, IdEntry};
