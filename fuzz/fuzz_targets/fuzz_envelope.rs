//! Fuzz target: `envelope::extract`
//!
//! Feeds arbitrary modem output to the JSON extractor for both response
//! shapes. It must never panic, and a fetch response that parses must
//! decode or reject its `new_code` cleanly.
//!
//! cargo fuzz run fuzz_envelope

#![no_main]

use cellota::modem::codec;
use cellota::ota::envelope;
use cellota::ota::messages::{UpdateCheckResponse, UpdateFetchResponse};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let _ = envelope::extract::<UpdateCheckResponse>(&text);

    if let Ok(fetch) = envelope::extract::<UpdateFetchResponse>(&text) {
        if let Some(code) = fetch.new_code.as_deref() {
            if let Ok(program) = codec::try_decode(code) {
                // A clean decode is always a valid re-encoding.
                assert_eq!(codec::encode(&program), code.to_ascii_lowercase());
            }
        }
    }
});
