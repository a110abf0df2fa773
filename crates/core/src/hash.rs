//! Content hashing
//!
//! The hash stored with every instrument lets downstream consumers detect a
//! change without re-reading the full record. It is the 64-bit XXH3 digest of
//! the record's canonical JSON form, rendered in decimal. Canonical means the
//! serializer's declared field order with set-valued fields already sorted,
//! so two equal records always hash identically. Instruments are normalized
//! first (see `FinancialInstrument::content_hash`), so empty strings and
//! absent values hash the same.

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::Result;

/// Compute the content hash of any serializable value
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let canonical = serde_json::to_vec(value)?;
    Ok(xxh3_64(&canonical).to_string())
}
