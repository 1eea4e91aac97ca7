//! Fuzz target: AT response scanners
//!
//! Arbitrary bytes as they would arrive from the UART. The scanners must
//! be total, and body extraction must never grow the text.
//!
//! cargo fuzz run fuzz_at_response

#![no_main]

use cellota::modem::at;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let _ = at::is_error(text);
    let _ = at::parse_context_id(text);
    let _ = at::parse_attached(text);

    let body = at::extract_body(text);
    assert!(body.len() <= text.len(), "extracted body longer than input");
});
