//! AT verbs for the SIM7020-family HTTP stack, and the few response
//! scanners the session needs.
//!
//! | Verb              | Purpose                                    |
//! |-------------------|--------------------------------------------|
//! | `+CHTTPCREATE`    | create an HTTP context for a base URL      |
//! | `+CHTTPCON`       | open the TCP connection for a context      |
//! | `+CHTTPSEND`      | issue GET (no body) or POST (hex body)     |
//! | `+CHTTPREAD`      | fetch the buffered response                |
//! | `+CHTTPDISCON`    | close the connection                       |
//! | `+CHTTPDESTROY`   | free the context                           |
//!
//! Response bodies may be pushed as `+CHTTPNMIC` notification lines whose
//! last field is the hex-encoded content chunk.

use std::borrow::Cow;

use super::codec;

// ── Bring-up commands ─────────────────────────────────────────

pub const PROBE: &str = "AT";
pub const ECHO_ON: &str = "ATE1";
pub const RADIO_OFF: &str = "AT+CFUN=0";
pub const RADIO_ON: &str = "AT+CFUN=1";
pub const ATTACH_STATUS: &str = "AT+CGATT?";

/// Default PDP context with the operator's APN.
pub fn define_pdp_context(apn: &str) -> String {
    format!("AT*MCGDEFCONT=\"IP\",\"{}\"", apn)
}

// ── HTTP context commands ─────────────────────────────────────

pub fn http_create(base_url: &str) -> String {
    format!("AT+CHTTPCREATE=\"{}\"", base_url)
}

pub fn http_connect(ctx: u8) -> String {
    format!("AT+CHTTPCON={}", ctx)
}

pub fn http_send_get(ctx: u8, path: &str) -> String {
    format!("AT+CHTTPSEND={},0,\"{}\"", ctx, path)
}

/// POST with an inline body. `hex_body` must already be codec-encoded.
pub fn http_send_post(ctx: u8, path: &str, content_type: &str, hex_body: &str) -> String {
    debug_assert!(codec::is_line_safe(hex_body));
    format!(
        "AT+CHTTPSEND={},1,\"{}\",,\"{}\",{}",
        ctx, path, content_type, hex_body
    )
}

pub fn http_read(ctx: u8) -> String {
    format!("AT+CHTTPREAD={}", ctx)
}

pub fn http_disconnect(ctx: u8) -> String {
    format!("AT+CHTTPDISCON={}", ctx)
}

pub fn http_destroy(ctx: u8) -> String {
    format!("AT+CHTTPDESTROY={}", ctx)
}

// ── Response scanners ─────────────────────────────────────────

const NMIC_PREFIX: &str = "+CHTTPNMIC:";
const CREATE_PREFIX: &str = "+CHTTPCREATE:";
const ATTACH_PREFIX: &str = "+CGATT:";

/// True if the response carries a final `ERROR` or `+CME ERROR` result.
pub fn is_error(text: &str) -> bool {
    text.lines().map(str::trim).any(|line| {
        line == "ERROR" || line.starts_with("+CME ERROR") || line.starts_with("+CMS ERROR")
    })
}

/// Context id from a `+CHTTPCREATE: <id>` line.
pub fn parse_context_id(text: &str) -> Option<u8> {
    text.lines()
        .find_map(|line| line.trim().strip_prefix(CREATE_PREFIX))
        .and_then(|rest| rest.trim().parse().ok())
}

/// Packet attach state from a `+CGATT: <0|1>` line.
pub fn parse_attached(text: &str) -> Option<bool> {
    text.lines()
        .find_map(|line| line.trim().strip_prefix(ATTACH_PREFIX))
        .map(|rest| rest.trim() == "1")
}

/// The HTTP body inside a read response.
///
/// When the modem delivered the body as `+CHTTPNMIC` chunks, their hex
/// content is joined and decoded. Otherwise the text is returned as-is so
/// the envelope parser can search it directly.
pub fn extract_body(text: &str) -> Cow<'_, str> {
    let mut joined = String::new();
    let mut chunks = 0;
    for line in text.lines() {
        let Some(rest) = line.trim().strip_prefix(NMIC_PREFIX) else {
            continue;
        };
        // <id>,<flag>,<content_len>,<package_len>,<data>
        if let Some(data) = rest.splitn(5, ',').nth(4) {
            joined.push_str(data.trim());
            chunks += 1;
        }
    }

    if chunks == 0 {
        return Cow::Borrowed(text);
    }
    match codec::try_decode(&joined) {
        Ok(body) => Cow::Owned(body),
        Err(_) => Cow::Borrowed(text),
    }
}
