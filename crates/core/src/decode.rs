//! Payload decoding
//!
//! Records arrive as JSON documents on a stream. Only the first value on the
//! stream is consumed, so a caller can decode from a request body without
//! buffering it first.

use std::io::Read;

use crate::error::{Error, Result};
use crate::types::FinancialInstrument;

/// Decode one instrument from a JSON stream
///
/// Returns the record together with its uuid for upstream keying and logging.
///
/// # Errors
///
/// Returns [`Error::InvalidPayload`] if the stream is empty or does not hold
/// a well-formed instrument document.
pub fn decode_json<R: Read>(reader: R) -> Result<(FinancialInstrument, String)> {
    let mut stream =
        serde_json::Deserializer::from_reader(reader).into_iter::<FinancialInstrument>();
    match stream.next() {
        Some(Ok(fi)) => {
            let uuid = fi.uuid.clone();
            Ok((fi, uuid))
        }
        Some(Err(e)) => Err(Error::InvalidPayload {
            reason: e.to_string(),
        }),
        None => Err(Error::InvalidPayload {
            reason: "empty payload".to_string(),
        }),
    }
}
