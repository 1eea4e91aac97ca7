//! Hex text codec.
//!
//! JSON bodies are carried inline on an AT command line, so they must not
//! contain whitespace, line terminators, quotes, or commas. Lowercase hex of
//! the UTF-8 bytes satisfies all of that and is what the server emits for
//! program payloads.
//!
//! Both directions are total: [`decode`] hands back its input unchanged
//! when it finds no encoding to undo. [`try_decode`] is the strict variant
//! for callers that must tell the two cases apart.

use crate::error::OtaError;

/// Encode text as lowercase hex of its UTF-8 bytes.
pub fn encode(text: &str) -> String {
    hex::encode(text.as_bytes())
}

/// Undo [`encode`], or return `wire` unchanged if it is not a valid encoding.
pub fn decode(wire: &str) -> String {
    try_decode(wire).unwrap_or_else(|_| wire.to_owned())
}

/// Undo [`encode`], failing on odd length, non-hex digits, or non-UTF-8 bytes.
pub fn try_decode(wire: &str) -> Result<String, OtaError> {
    let bytes = hex::decode(wire).map_err(|_| OtaError::Decode)?;
    String::from_utf8(bytes).map_err(|_| OtaError::Decode)
}

/// True if every char can sit inside a single AT command token.
pub fn is_line_safe(wire: &str) -> bool {
    wire.bytes().all(|b| b.is_ascii_alphanumeric())
}
