//! Tolerant JSON extraction from modem response text.
//!
//! Read responses wrap the server body in command echoes, `OK` lines and
//! notification prefixes. Rather than cutting between the first `{` and
//! the last `}`, each `{` is tried as the start of a real JSON parse. The
//! first one that yields a complete JSON value is the server's reply, and
//! it either matches `T` or the extraction fails. Objects nested inside
//! that reply are never considered on their own.
//!
//! Trailing bytes after the reply are ignored, and braces inside string
//! fields cannot confuse the search.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::OtaError;

/// The first complete JSON value in `text`, deserialized as `T`.
pub fn extract<T: DeserializeOwned>(text: &str) -> Result<T, OtaError> {
    let value = first_value(text).ok_or(OtaError::Schema)?;
    serde_json::from_value(value).map_err(|e| {
        log::debug!("JSON reply did not match the expected schema: {}", e);
        OtaError::Schema
    })
}

/// Parse from each `{` in turn until one yields a complete value.
///
/// Only syntax and EOF errors move the search on; they mean this `{` was
/// noise or the start of a cut-off object.
fn first_value(text: &str) -> Option<Value> {
    for (idx, _) in text.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&text[idx..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => return Some(value),
            Some(Err(e)) if e.is_syntax() || e.is_eof() => {}
            Some(Err(e)) => {
                log::debug!("JSON parse stopped: {}", e);
                return None;
            }
            None => {}
        }
    }
    None
}
