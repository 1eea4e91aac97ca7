//! Framed command channel — one command line out, one time window of bytes back.
//!
//! ```text
//!   send("AT+X", 3000)
//!     │  write "AT+X\r\n"
//!     ▼
//!   ┌──────────── poll loop ────────────┐
//!   │ read what is available            │
//!   │ sleep one slice                   │──▶ deadline / buffer cap
//!   └───────────────────────────────────┘
//!     │  decode as UTF-8 or mark Binary
//!     ▼
//!   CommandResult
//! ```
//!
//! The channel does not parse modem grammar: whatever arrives inside the
//! window is the response. It never retries and never raises; a failed
//! write is logged and reported as an empty result so one bad exchange
//! cannot abort a whole session.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::app::ports::Clock;
use crate::config::OtaConfig;

use super::link::SerialLink;

/// Line terminator appended to every command.
const LINE_END: &[u8] = b"\r\n";

/// Bytes pulled from the link per poll iteration.
const READ_CHUNK: usize = 64;

/// Longest response text echoed into the debug log.
const LOG_PREVIEW_CHARS: usize = 160;

// ── Result types ──────────────────────────────────────────────

/// Decoded view of the accumulated response bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Bytes were valid UTF-8 (possibly empty).
    Text(String),
    /// Bytes arrived but are not text. Do not string-search these.
    Binary,
}

/// Why an exchange produced no bytes through no fault of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFault {
    /// The command could not be written.
    Write,
    /// Reading failed part-way through the window.
    Read,
}

/// Outcome of one [`CommandChannel::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub raw: Vec<u8>,
    pub payload: Payload,
    pub elapsed_ms: u64,
    pub fault: Option<LinkFault>,
    /// The response was cut short, by the byte cap or mid-character.
    pub truncated: bool,
}

impl CommandResult {
    fn failed(fault: LinkFault) -> Self {
        Self {
            raw: Vec::new(),
            payload: Payload::Text(String::new()),
            elapsed_ms: 0,
            fault: Some(fault),
            truncated: false,
        }
    }

    fn from_bytes(raw: Vec<u8>, elapsed_ms: u64, fault: Option<LinkFault>, capped: bool) -> Self {
        let mut truncated = capped;
        let payload = match core::str::from_utf8(&raw) {
            Ok(text) => Payload::Text(text.to_owned()),
            // Only the final sequence is incomplete: the window closed
            // inside a character. Keep the text before it.
            Err(e) if e.error_len().is_none() => {
                truncated = true;
                match core::str::from_utf8(&raw[..e.valid_up_to()]) {
                    Ok(text) => Payload::Text(text.to_owned()),
                    Err(_) => Payload::Binary,
                }
            }
            Err(_) => Payload::Binary,
        };
        Self {
            raw,
            payload,
            elapsed_ms,
            fault,
            truncated,
        }
    }

    /// No bytes arrived at all.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn is_binary(&self) -> bool {
        self.payload == Payload::Binary
    }

    /// Decoded text, or `None` for binary payloads.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(t) => Some(t),
            Payload::Binary => None,
        }
    }
}

// ── Channel ───────────────────────────────────────────────────

/// Exclusive owner of the serial link and the time source used to wait on it.
pub struct CommandChannel<L, T> {
    link: L,
    timer: T,
    poll_slice_ms: u32,
    max_response_bytes: usize,
}

impl<L, T> CommandChannel<L, T>
where
    L: SerialLink,
    T: Clock + DelayNs,
{
    pub fn new(link: L, timer: T, config: &OtaConfig) -> Self {
        Self {
            link,
            timer,
            poll_slice_ms: config.poll_slice_ms.max(1),
            max_response_bytes: config.max_response_bytes,
        }
    }

    /// Write `command` plus a line terminator, then collect bytes until
    /// `timeout_ms` has elapsed or the response buffer is full.
    pub fn send(&mut self, command: &str, timeout_ms: u32) -> CommandResult {
        debug!("CMD: {}", preview(command));

        let mut frame = Vec::with_capacity(command.len() + LINE_END.len());
        frame.extend_from_slice(command.as_bytes());
        frame.extend_from_slice(LINE_END);

        if let Err(fault) = self.write_frame(&frame) {
            warn!("Link write failed for '{}'", preview(command));
            return CommandResult::failed(fault);
        }

        let result = self.collect(timeout_ms);
        match &result.payload {
            Payload::Text(t) => debug!("RESP: {}", preview(t.trim())),
            Payload::Binary => debug!("RESP: <{} bytes binary>", result.raw.len()),
        }
        result
    }

    /// Discard anything already waiting on the link. Returns bytes dropped.
    pub fn drain(&mut self) -> usize {
        let mut buf = [0u8; READ_CHUNK];
        let mut dropped = 0;
        while self.link.available() {
            match self.link.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => dropped += n,
            }
        }
        if dropped > 0 {
            debug!("Drained {} stale bytes", dropped);
        }
        dropped
    }

    /// Blocking wait; the only suspension point besides the poll loop.
    pub fn settle(&mut self, ms: u32) {
        if ms > 0 {
            self.timer.delay_ms(ms);
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn into_parts(self) -> (L, T) {
        (self.link, self.timer)
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkFault> {
        let mut written = 0;
        while written < frame.len() {
            match self.link.write(&frame[written..]) {
                Ok(0) => return Err(LinkFault::Write),
                Ok(n) => written += n,
                Err(e) => {
                    warn!("Link write error: {:?}", e);
                    return Err(LinkFault::Write);
                }
            }
        }
        self.link.flush().map_err(|e| {
            warn!("Link flush error: {:?}", e);
            LinkFault::Write
        })
    }

    fn collect(&mut self, timeout_ms: u32) -> CommandResult {
        let start = self.timer.now_ms();
        let deadline = u64::from(timeout_ms);
        let mut raw = Vec::new();
        let mut buf = [0u8; READ_CHUNK];
        let mut fault = None;
        let mut capped = false;

        loop {
            if self.timer.now_ms().saturating_sub(start) >= deadline {
                break;
            }

            while self.link.available() && raw.len() < self.max_response_bytes {
                match self.link.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        let room = self.max_response_bytes - raw.len();
                        raw.extend_from_slice(&buf[..n.min(room)]);
                    }
                    Err(e) => {
                        warn!("Link read error after {} bytes: {:?}", raw.len(), e);
                        fault = Some(LinkFault::Read);
                        break;
                    }
                }
            }

            if fault.is_some() {
                break;
            }
            if raw.len() >= self.max_response_bytes {
                warn!("Response truncated at {} bytes", self.max_response_bytes);
                capped = true;
                break;
            }

            self.timer.delay_ms(self.poll_slice_ms);
        }

        let elapsed = self.timer.now_ms().saturating_sub(start);
        CommandResult::from_bytes(raw, elapsed, fault, capped)
    }
}

/// Clip log output on a char boundary.
pub(crate) fn preview(text: &str) -> &str {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
