//! AT-HTTP session — one HTTP request built out of command/response pairs.
//!
//! ```text
//!  Idle ──create──▶ Created ──connect──▶ Connected ──send──▶ Sent ──read──▶ Read
//!    │                 │                     │                 │              │
//!    └─────────────────┴─────── teardown ────┴─────────────────┴──────────────┘
//!                                    ▼
//!                                 Closed
//! ```
//!
//! A session borrows the channel for exactly one exchange. Dropping it runs
//! [`HttpSession::teardown`] if the caller has not, so no early return can
//! leave a half-open HTTP context on the modem.
//!
//! Every step is fail-soft: an empty, binary, or `ERROR` response ends the
//! exchange with a [`SessionError`], and teardown still follows.

use core::fmt;

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::app::ports::Clock;
use crate::config::{ExchangeProfile, OtaConfig};
use crate::error::OtaError;

use super::at;
use super::channel::{CommandChannel, CommandResult, Payload};
use super::codec;
use super::link::SerialLink;

// ── State machine ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Created,
    Connected,
    Sent,
    Read,
    Closed,
}

/// The exchange step a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Create,
    Connect,
    Send,
    Read,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Connect => write!(f, "connect"),
            Self::Send => write!(f, "send"),
            Self::Read => write!(f, "read"),
        }
    }
}

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// A step was called from the wrong state.
    OutOfOrder { step: Step, state: SessionState },
    /// Nothing arrived before the step's deadline.
    NoResponse(Step),
    /// The link failed while writing or reading.
    LinkDown(Step),
    /// Bytes arrived but were not text.
    Binary(Step),
    /// The modem answered `ERROR`.
    Rejected(Step),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfOrder { step, state } => write!(f, "{step} called in state {state:?}"),
            Self::NoResponse(step) => write!(f, "{step}: no response"),
            Self::LinkDown(step) => write!(f, "{step}: link failure"),
            Self::Binary(step) => write!(f, "{step}: binary response"),
            Self::Rejected(step) => write!(f, "{step}: modem returned ERROR"),
        }
    }
}

impl From<SessionError> for OtaError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NoResponse(_) => Self::Timeout,
            SessionError::Binary(_) => Self::Decode,
            SessionError::LinkDown(_)
            | SessionError::Rejected(_)
            | SessionError::OutOfOrder { .. } => Self::Link,
        }
    }
}

// ── Request description ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One HTTP request relative to the session's base URL.
#[derive(Debug, Clone, Copy)]
pub struct HttpRequest<'a> {
    pub method: Method,
    pub path: &'a str,
    pub content_type: Option<&'a str>,
    /// Plain-text body; encoded for the command line by the session.
    pub body: Option<&'a str>,
}

impl<'a> HttpRequest<'a> {
    pub fn get(path: &'a str) -> Self {
        Self {
            method: Method::Get,
            path,
            content_type: None,
            body: None,
        }
    }

    pub fn post_json(path: &'a str, body: &'a str) -> Self {
        Self {
            method: Method::Post,
            path,
            content_type: Some("application/json"),
            body: Some(body),
        }
    }
}

/// Fixed per-step timings, taken from [`OtaConfig`].
#[derive(Debug, Clone, Copy)]
pub struct SessionTimings {
    pub command_timeout_ms: u32,
    pub create_settle_ms: u32,
    pub connect_settle_ms: u32,
}

impl From<&OtaConfig> for SessionTimings {
    fn from(c: &OtaConfig) -> Self {
        Self {
            command_timeout_ms: c.command_timeout_ms,
            create_settle_ms: c.create_settle_ms,
            connect_settle_ms: c.connect_settle_ms,
        }
    }
}

// ── Session ───────────────────────────────────────────────────

pub struct HttpSession<'c, L, T>
where
    L: SerialLink,
    T: Clock + DelayNs,
{
    channel: &'c mut CommandChannel<L, T>,
    timings: SessionTimings,
    state: SessionState,
    ctx: u8,
    create_attempted: bool,
}

impl<'c, L, T> HttpSession<'c, L, T>
where
    L: SerialLink,
    T: Clock + DelayNs,
{
    pub fn open(channel: &'c mut CommandChannel<L, T>, timings: SessionTimings) -> Self {
        Self {
            channel,
            timings,
            state: SessionState::Idle,
            ctx: 0,
            create_attempted: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// HTTP context id assigned by the modem (0 until created).
    pub fn context_id(&self) -> u8 {
        self.ctx
    }

    /// `Idle → Created`
    pub fn create(&mut self, base_url: &str) -> Result<(), SessionError> {
        self.expect(Step::Create, SessionState::Idle)?;
        self.create_attempted = true;
        let text = self.run_step(Step::Create, &at::http_create(base_url), None)?;
        self.ctx = at::parse_context_id(&text).unwrap_or(0);
        self.channel.settle(self.timings.create_settle_ms);
        self.state = SessionState::Created;
        Ok(())
    }

    /// `Created → Connected`
    pub fn connect(&mut self) -> Result<(), SessionError> {
        self.expect(Step::Connect, SessionState::Created)?;
        self.run_step(Step::Connect, &at::http_connect(self.ctx), None)?;
        self.channel.settle(self.timings.connect_settle_ms);
        self.state = SessionState::Connected;
        Ok(())
    }

    /// `Connected → Sent`, then wait `settle_ms` for the server to answer.
    pub fn send(&mut self, request: &HttpRequest<'_>, settle_ms: u32) -> Result<(), SessionError> {
        self.expect(Step::Send, SessionState::Connected)?;
        let command = match request.method {
            Method::Get => at::http_send_get(self.ctx, request.path),
            Method::Post => at::http_send_post(
                self.ctx,
                request.path,
                request.content_type.unwrap_or("text/plain"),
                &codec::encode(request.body.unwrap_or_default()),
            ),
        };
        self.run_step(Step::Send, &command, None)?;
        self.channel.settle(settle_ms);
        self.state = SessionState::Sent;
        Ok(())
    }

    /// `Sent → Read`. Returns the full response text, protocol noise included.
    pub fn read(&mut self, timeout_ms: u32) -> Result<String, SessionError> {
        self.expect(Step::Read, SessionState::Sent)?;
        let text = self.run_step(Step::Read, &at::http_read(self.ctx), Some(timeout_ms))?;
        self.state = SessionState::Read;
        Ok(text)
    }

    /// Best-effort `* → Closed`. Failures are logged, never returned.
    pub fn teardown(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if self.create_attempted {
            for command in [at::http_disconnect(self.ctx), at::http_destroy(self.ctx)] {
                let result = self.channel.send(&command, self.timings.command_timeout_ms);
                if result.is_empty() || result.text().is_some_and(at::is_error) {
                    warn!("HTTP teardown: '{}' failed (ignored)", command);
                }
            }
        }
        debug!("HTTP session closed from {:?}", self.state);
        self.state = SessionState::Closed;
    }

    fn expect(&self, step: Step, wanted: SessionState) -> Result<(), SessionError> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(SessionError::OutOfOrder {
                step,
                state: self.state,
            })
        }
    }

    fn run_step(&mut self, step: Step, command: &str, timeout_ms: Option<u32>) -> Result<String, SessionError> {
        let timeout = timeout_ms.unwrap_or(self.timings.command_timeout_ms);
        let result = self.channel.send(command, timeout);
        if result.truncated {
            warn!("HTTP session: {} response truncated at {} bytes", step, result.raw.len());
        }
        classify(step, result).inspect_err(|e| warn!("HTTP session: {}", e))
    }
}

impl<L, T> Drop for HttpSession<'_, L, T>
where
    L: SerialLink,
    T: Clock + DelayNs,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

fn classify(step: Step, result: CommandResult) -> Result<String, SessionError> {
    if result.is_empty() {
        return Err(match result.fault {
            Some(_) => SessionError::LinkDown(step),
            None => SessionError::NoResponse(step),
        });
    }
    match result.payload {
        Payload::Binary => Err(SessionError::Binary(step)),
        Payload::Text(text) if at::is_error(&text) => Err(SessionError::Rejected(step)),
        Payload::Text(text) => Ok(text),
    }
}

/// Run one complete create → connect → send → read → teardown exchange.
///
/// Teardown runs on every path; the error says which step gave up.
pub fn exchange<L, T>(
    channel: &mut CommandChannel<L, T>,
    timings: SessionTimings,
    base_url: &str,
    request: &HttpRequest<'_>,
    profile: ExchangeProfile,
) -> Result<String, SessionError>
where
    L: SerialLink,
    T: Clock + DelayNs,
{
    let mut session = HttpSession::open(channel, timings);
    session.create(base_url)?;
    session.connect()?;
    session.send(request, profile.send_settle_ms)?;
    let text = session.read(profile.read_timeout_ms)?;
    session.teardown();
    Ok(text)
}
