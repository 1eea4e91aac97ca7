//! OTA update lifecycle — check, fetch, apply.
//!
//! ```text
//!  perform_ota_update()
//!    │
//!    ├─ check_for_update ──▶ none / failed ──▶ NoUpdate
//!    │        │ update_available
//!    ├─ fetch_update ──────▶ failed ─────────▶ Failed(reason)
//!    │        │ program text
//!    └─ apply_update ──────▶ ApplyError ─────▶ Failed(Apply), error pattern
//!             │ installed
//!             └──▶ settle, restart
//! ```
//!
//! Each of check and fetch is one complete HTTP session. Transport, decode
//! and schema failures are values here: they are logged, emitted as events,
//! and folded into the cycle outcome. Nothing in a cycle panics or returns
//! an error to the scheduler.

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};
use serde::Serialize;

use crate::app::events::OtaEvent;
use crate::app::ports::{Clock, EventSink, ImageStore, StatusIndicator, SystemControl};
use crate::config::{ExchangeProfile, OtaConfig};
use crate::drivers::led_patterns::Pattern;
use crate::error::{ApplyError, OtaError};
use crate::modem::at;
use crate::modem::channel::CommandChannel;
use crate::modem::codec;
use crate::modem::link::SerialLink;
use crate::modem::session::{self, HttpRequest, SessionTimings};

use super::envelope;
use super::image::{self, Applied};
use super::messages::{
    DeviceIdentity, UpdateCheckRequest, UpdateCheckResponse, UpdateFetchRequest, UpdateFetchResponse,
};

/// How one update cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing newer on the server, or the check could not be completed.
    NoUpdate,
    /// A new program is in the boot slot and a restart was requested.
    Applied(Applied),
    /// An update was offered but could not be downloaded or installed.
    Failed(OtaError),
}

/// Owns everything an update cycle touches.
pub struct OtaUpdater<L, T, S, I, R> {
    channel: CommandChannel<L, T>,
    store: S,
    indicator: I,
    system: R,
    identity: DeviceIdentity,
    config: OtaConfig,
}

impl<L, T, S, I, R> OtaUpdater<L, T, S, I, R>
where
    L: SerialLink,
    T: Clock + DelayNs,
    S: ImageStore,
    I: StatusIndicator,
    R: SystemControl,
{
    pub fn new(
        channel: CommandChannel<L, T>,
        store: S,
        indicator: I,
        system: R,
        identity: DeviceIdentity,
        config: OtaConfig,
    ) -> Self {
        Self {
            channel,
            store,
            indicator,
            system,
            identity,
            config,
        }
    }

    // ── Operations ────────────────────────────────────────────

    /// Ask the server whether a newer program exists.
    ///
    /// `Some` only when the server says an update is available. Up-to-date
    /// answers and every failure return `None`; the difference is kept in
    /// the emitted event.
    pub fn check_for_update(&mut self, sink: &mut impl EventSink) -> Option<UpdateCheckResponse> {
        sink.emit(&OtaEvent::CheckStarted);
        match self.check() {
            Ok(resp) if resp.update_available => {
                info!(
                    "Update available: {} ({})",
                    resp.new_version.as_deref().unwrap_or("?"),
                    resp.description.as_deref().unwrap_or("no description")
                );
                sink.emit(&OtaEvent::UpdateAvailable {
                    version: resp.new_version.clone(),
                    description: resp.description.clone(),
                });
                Some(resp)
            }
            Ok(resp) => {
                info!("No update: {}", resp.message.as_deref().unwrap_or("up to date"));
                sink.emit(&OtaEvent::UpToDate { message: resp.message });
                None
            }
            Err(e) => {
                warn!("Update check failed: {}", e);
                sink.emit(&OtaEvent::CheckFailed(e));
                None
            }
        }
    }

    /// Download and decode the offered program.
    pub fn fetch_update(&mut self, sink: &mut impl EventSink) -> Option<String> {
        self.download(sink).ok()
    }

    /// Install `program` and restart into it.
    ///
    /// Success drops back to the heartbeat pattern before the restart settle.
    /// On failure the error pattern is shown and no restart happens; the
    /// device keeps running the resident program.
    pub fn apply_update(&mut self, program: &str, sink: &mut impl EventSink) -> Result<Applied, ApplyError> {
        self.indicator.signal(Pattern::Updating);

        let applied = match image::install(&mut self.store, program) {
            Ok(applied) => applied,
            Err(e) => {
                error!("Apply failed: {}", e);
                self.indicator.signal(Pattern::Error);
                sink.emit(&OtaEvent::ApplyFailed(e));
                return Err(e);
            }
        };

        sink.emit(&OtaEvent::Applied(applied));
        self.indicator.signal(Pattern::Heartbeat);
        self.channel.settle(self.config.restart_settle_ms);
        info!("Restarting into new program");
        sink.emit(&OtaEvent::Restarting);
        self.system.restart();
        Ok(applied)
    }

    /// One full check → fetch → apply cycle.
    pub fn perform_ota_update(&mut self, sink: &mut impl EventSink) -> CycleOutcome {
        if self.check_for_update(sink).is_none() {
            return CycleOutcome::NoUpdate;
        }
        let program = match self.download(sink) {
            Ok(program) => program,
            Err(e) => return CycleOutcome::Failed(e),
        };
        match self.apply_update(&program, sink) {
            Ok(applied) => CycleOutcome::Applied(applied),
            Err(e) => CycleOutcome::Failed(e.into()),
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn config(&self) -> &OtaConfig {
        &self.config
    }

    pub fn channel(&self) -> &CommandChannel<L, T> {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut CommandChannel<L, T> {
        &mut self.channel
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn indicator_mut(&mut self) -> &mut I {
        &mut self.indicator
    }

    pub fn system(&self) -> &R {
        &self.system
    }

    // ── Internals ─────────────────────────────────────────────

    fn download(&mut self, sink: &mut impl EventSink) -> Result<String, OtaError> {
        self.indicator.signal(Pattern::Updating);
        match self.fetch() {
            Ok(program) => {
                info!("Downloaded {} byte program", program.len());
                sink.emit(&OtaEvent::Downloaded { bytes: program.len() });
                Ok(program)
            }
            Err(e) => {
                warn!("Update download failed: {}", e);
                sink.emit(&OtaEvent::FetchFailed(e));
                Err(e)
            }
        }
    }

    fn check(&mut self) -> Result<UpdateCheckResponse, OtaError> {
        let json = to_json(&UpdateCheckRequest::new(&self.identity))?;
        let text = self.post(&json, self.config.check)?;
        envelope::extract(&at::extract_body(&text))
    }

    fn fetch(&mut self) -> Result<String, OtaError> {
        let json = to_json(&UpdateFetchRequest::new(&self.identity))?;
        let text = self.post(&json, self.config.download)?;
        let resp: UpdateFetchResponse = envelope::extract(&at::extract_body(&text))?;

        if resp.refused() {
            warn!("Server refused download: {}", resp.error.as_deref().unwrap_or("no reason given"));
            return Err(OtaError::Schema);
        }
        let wire = resp.new_code.as_deref().map(str::trim).ok_or(OtaError::Schema)?;
        let program = codec::try_decode(wire)?;
        if program.is_empty() {
            return Err(OtaError::Schema);
        }
        if let Some(expected) = resp.sha256.as_deref() {
            if !image::matches_digest(program.as_bytes(), expected) {
                warn!("Downloaded program does not match advertised sha256");
                return Err(OtaError::Decode);
            }
        }
        if let Some(version) = resp.version.as_deref() {
            info!("Fetched version {}", version);
        }
        Ok(program)
    }

    fn post(&mut self, json: &str, profile: ExchangeProfile) -> Result<String, OtaError> {
        let request = HttpRequest::post_json(&self.config.ota_path, json);
        let timings = SessionTimings::from(&self.config);
        let text = session::exchange(&mut self.channel, timings, &self.config.server_url, &request, profile)?;
        Ok(text)
    }
}

fn to_json<B: Serialize>(body: &B) -> Result<String, OtaError> {
    serde_json::to_string(body).map_err(|_| OtaError::Schema)
}
