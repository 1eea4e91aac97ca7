//! Scripted modem and in-memory adapters for integration tests.
//!
//! [`FakeModem`] answers AT commands the way a SIM7020 does: it echoes the
//! command, replies `OK` to context verbs, and serves the read response
//! chosen by the `action` field of the last POST body. Any verb can be
//! overridden with silence, `ERROR`, or raw bytes.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use cellota::app::events::OtaEvent;
use cellota::app::ports::{Clock, EventSink, ImageStore, Slot, StatusIndicator, StoreError, SystemControl};
use cellota::config::OtaConfig;
use cellota::drivers::led_patterns::Pattern;
use cellota::modem::channel::CommandChannel;
use cellota::modem::codec;
use cellota::modem::link::SerialLink;
use cellota::ota::lifecycle::OtaUpdater;
use cellota::ota::messages::DeviceIdentity;
use embedded_hal::delay::DelayNs;

// ── Time ──────────────────────────────────────────────────────

/// Clock that only moves when something sleeps on it.
#[derive(Debug, Default)]
pub struct FakeTime {
    now_ms: u64,
    pub slept_ms: u64,
}

impl Clock for FakeTime {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

impl DelayNs for FakeTime {
    fn delay_ns(&mut self, ns: u32) {
        let ms = u64::from(ns).div_ceil(1_000_000);
        self.now_ms += ms;
        self.slept_ms += ms;
    }
}

// ── Modem ─────────────────────────────────────────────────────

/// What the fake modem sends back for one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Echo, `OK`, then the body as plain text.
    Body(String),
    /// Echo, `OK`, then the body hex-encoded in two `+CHTTPNMIC` chunks.
    Nmic(String),
    /// Exactly these bytes, no echo.
    Raw(Vec<u8>),
    /// Nothing at all.
    Silent,
    /// Echo, then `ERROR`.
    Error,
}

#[derive(Debug)]
pub struct LinkDown;

pub struct FakeModem {
    pub commands: Vec<String>,
    /// Decoded JSON bodies of every POST, in order.
    pub posted: Vec<String>,
    pub check_reply: Reply,
    pub fetch_reply: Reply,
    /// Verb substring → forced reply. First match wins.
    pub overrides: Vec<(&'static str, Reply)>,
    pub fail_writes: bool,
    last_action: Option<String>,
    pending: Vec<u8>,
    rx: VecDeque<u8>,
}

impl FakeModem {
    pub fn new(check_reply: Reply, fetch_reply: Reply) -> Self {
        Self {
            commands: Vec::new(),
            posted: Vec::new(),
            check_reply,
            fetch_reply,
            overrides: Vec::new(),
            fail_writes: false,
            last_action: None,
            pending: Vec::new(),
            rx: VecDeque::new(),
        }
    }

    pub fn with_override(mut self, verb: &'static str, reply: Reply) -> Self {
        self.overrides.push((verb, reply));
        self
    }

    /// Commands whose text contains `verb`.
    pub fn count(&self, verb: &str) -> usize {
        self.commands.iter().filter(|c| c.contains(verb)).count()
    }

    /// Position of the first command containing `verb`.
    pub fn position(&self, verb: &str) -> Option<usize> {
        self.commands.iter().position(|c| c.contains(verb))
    }

    fn respond(&mut self, command: &str) {
        if command.contains("CHTTPSEND") && command.contains(",1,") {
            self.record_post(command);
        }

        let forced = self
            .overrides
            .iter()
            .find(|(verb, _)| command.contains(verb))
            .map(|(_, r)| r.clone());
        let reply = match forced {
            Some(r) => r,
            None if command.contains("CHTTPREAD") => match self.last_action.as_deref() {
                Some("download_update") => self.fetch_reply.clone(),
                _ => self.check_reply.clone(),
            },
            None if command.contains("CHTTPCREATE") => Reply::Raw(format!("{command}\r\n+CHTTPCREATE: 0\r\n\r\nOK\r\n").into_bytes()),
            None if command == "AT+CGATT?" => Reply::Raw(format!("{command}\r\n+CGATT: 1\r\n\r\nOK\r\n").into_bytes()),
            None => Reply::Body(String::new()),
        };
        let bytes = render(command, reply);
        self.rx.extend(bytes);
    }

    fn record_post(&mut self, command: &str) {
        let Some(hex_body) = command.rsplit(',').next() else {
            return;
        };
        let json = codec::decode(hex_body);
        self.last_action = serde_json::from_str::<serde_json::Value>(&json)
            .ok()
            .and_then(|v| v.get("action").and_then(|a| a.as_str()).map(String::from));
        self.posted.push(json);
    }
}

fn render(command: &str, reply: Reply) -> Vec<u8> {
    match reply {
        Reply::Body(body) if body.is_empty() => format!("{command}\r\n\r\nOK\r\n").into_bytes(),
        Reply::Body(body) => format!("{command}\r\n\r\nOK\r\n{body}\r\n").into_bytes(),
        Reply::Nmic(body) => {
            let hex = codec::encode(&body);
            let (a, b) = hex.split_at(hex.len() / 2);
            format!(
                "{command}\r\n\r\nOK\r\n\r\n+CHTTPNMIC: 0,1,{total},{la},{a}\r\n+CHTTPNMIC: 0,0,{total},{lb},{b}\r\n",
                total = body.len(),
                la = a.len() / 2,
                lb = b.len() / 2,
            )
            .into_bytes()
        }
        Reply::Raw(bytes) => bytes,
        Reply::Silent => Vec::new(),
        Reply::Error => format!("{command}\r\n\r\nERROR\r\n").into_bytes(),
    }
}

impl SerialLink for FakeModem {
    type Error = LinkDown;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkDown> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, LinkDown> {
        if self.fail_writes {
            return Err(LinkDown);
        }
        self.pending.extend_from_slice(data);
        while let Some(pos) = self.pending.windows(2).position(|w| w == b"\r\n") {
            let line: Vec<u8> = self.pending.drain(..pos + 2).collect();
            let command = String::from_utf8_lossy(&line[..pos]).into_owned();
            self.commands.push(command.clone());
            self.respond(&command);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), LinkDown> {
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx.is_empty()
    }
}

// ── Image store ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read(Slot),
    Write(Slot),
    Discard(Slot),
    Promote,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub slots: HashMap<Slot, Vec<u8>>,
    pub ops: std::cell::RefCell<Vec<StoreOp>>,
    pub fail_write: Option<Slot>,
    pub fail_promote: bool,
    pub corrupt_staging: bool,
}

impl MemoryStore {
    pub fn with_boot(program: &str) -> Self {
        let mut s = Self::default();
        s.slots.insert(Slot::Boot, program.as_bytes().to_vec());
        s
    }

    pub fn text(&self, slot: Slot) -> Option<String> {
        self.slots.get(&slot).map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.borrow().clone()
    }

    pub fn op_index(&self, op: StoreOp) -> Option<usize> {
        self.ops.borrow().iter().position(|o| *o == op)
    }
}

impl ImageStore for MemoryStore {
    fn read(&self, slot: Slot) -> Result<Vec<u8>, StoreError> {
        self.ops.borrow_mut().push(StoreOp::Read(slot));
        let mut data = self.slots.get(&slot).cloned().ok_or(StoreError::NotFound)?;
        if slot == Slot::Staging && self.corrupt_staging {
            data.push(b'!');
        }
        Ok(data)
    }

    fn write(&mut self, slot: Slot, data: &[u8]) -> Result<(), StoreError> {
        self.ops.borrow_mut().push(StoreOp::Write(slot));
        if self.fail_write == Some(slot) {
            return Err(StoreError::Full);
        }
        self.slots.insert(slot, data.to_vec());
        Ok(())
    }

    fn discard(&mut self, slot: Slot) -> Result<(), StoreError> {
        self.ops.borrow_mut().push(StoreOp::Discard(slot));
        self.slots.remove(&slot);
        Ok(())
    }

    fn promote_staged(&mut self) -> Result<(), StoreError> {
        self.ops.borrow_mut().push(StoreOp::Promote);
        if self.fail_promote {
            return Err(StoreError::IoError);
        }
        let staged = self.slots.remove(&Slot::Staging).ok_or(StoreError::NotFound)?;
        self.slots.insert(Slot::Boot, staged);
        Ok(())
    }
}

// ── Recording ports ───────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSystem {
    pub restarts: u32,
}

impl SystemControl for RecordingSystem {
    fn restart(&mut self) {
        self.restarts += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingIndicator {
    pub patterns: Vec<Pattern>,
}

impl RecordingIndicator {
    pub fn shown(&self, pattern: Pattern) -> bool {
        self.patterns.contains(&pattern)
    }
}

impl StatusIndicator for RecordingIndicator {
    fn signal(&mut self, pattern: Pattern) {
        self.patterns.push(pattern);
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<OtaEvent>,
}

impl RecordingSink {
    pub fn contains(&self, pred: impl Fn(&OtaEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &OtaEvent) {
        self.events.push(event.clone());
    }
}

// ── Builders ──────────────────────────────────────────────────

pub type TestUpdater = OtaUpdater<FakeModem, FakeTime, MemoryStore, RecordingIndicator, RecordingSystem>;

pub fn test_identity() -> DeviceIdentity {
    DeviceIdentity {
        device_id: String::from("OTA-EFCAFE"),
        firmware_version: String::from("1.0.0"),
    }
}

pub fn test_channel(modem: FakeModem) -> CommandChannel<FakeModem, FakeTime> {
    CommandChannel::new(modem, FakeTime::default(), &OtaConfig::default())
}

pub fn test_updater(modem: FakeModem, store: MemoryStore) -> TestUpdater {
    OtaUpdater::new(
        test_channel(modem),
        store,
        RecordingIndicator::default(),
        RecordingSystem::default(),
        test_identity(),
        OtaConfig::default(),
    )
}

/// `{"new_code": "<hex of program>"}`
pub fn fetch_body(program: &str) -> String {
    format!(r#"{{"new_code":"{}"}}"#, codec::encode(program))
}

pub const UP_TO_DATE: &str = r#"{"update_available": false, "message": "up to date"}"#;
pub const UPDATE_2_0_0: &str = r#"{"update_available": true, "new_version": "2.0.0"}"#;
