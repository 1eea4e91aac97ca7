//! Application service — the periodic update trigger.
//!
//! [`OtaService`] owns the [`OtaUpdater`] and a tick counter. The main
//! loop calls [`OtaService::tick`] once per period; every
//! `check_interval_ticks` ticks one update cycle runs.
//!
//! ```text
//!  main loop ──tick──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                      │       OtaService        │
//!                      │ heartbeat · tick count  │
//!                      └───────────┬─────────────┘
//!                                  ▼
//!                            OtaUpdater
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::drivers::led_patterns::Pattern;
use crate::modem::link::SerialLink;
use crate::ota::lifecycle::{CycleOutcome, OtaUpdater};

use super::events::OtaEvent;
use super::ports::{Clock, EventSink, ImageStore, StatusIndicator, SystemControl};

pub struct OtaService<L, T, S, I, R> {
    updater: OtaUpdater<L, T, S, I, R>,
    check_interval_ticks: u32,
    ticks_since_check: u32,
    tick_count: u64,
}

impl<L, T, S, I, R> OtaService<L, T, S, I, R>
where
    L: SerialLink,
    T: Clock + DelayNs,
    S: ImageStore,
    I: StatusIndicator,
    R: SystemControl,
{
    pub fn new(updater: OtaUpdater<L, T, S, I, R>) -> Self {
        let check_interval_ticks = updater.config().check_interval_ticks.max(1);
        Self {
            updater,
            check_interval_ticks,
            ticks_since_check: 0,
            tick_count: 0,
        }
    }

    /// Announce the running identity.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        let id = self.updater.identity();
        info!(
            "OtaService started: device {} firmware {} (check every {} ticks)",
            id.device_id, id.firmware_version, self.check_interval_ticks
        );
        sink.emit(&OtaEvent::Started {
            device_id: id.device_id.clone(),
            firmware_version: id.firmware_version.clone(),
        });
    }

    /// One main-loop iteration: heartbeat, and an update cycle when due.
    ///
    /// Returns the cycle outcome on ticks that ran one.
    pub fn tick(&mut self, sink: &mut impl EventSink) -> Option<CycleOutcome> {
        self.tick_count += 1;
        self.updater.indicator_mut().signal(Pattern::Heartbeat);

        self.ticks_since_check += 1;
        if self.ticks_since_check < self.check_interval_ticks {
            debug!("Tick {} ({}/{})", self.tick_count, self.ticks_since_check, self.check_interval_ticks);
            return None;
        }
        self.ticks_since_check = 0;

        info!("=== OTA update cycle (tick {}) ===", self.tick_count);
        let outcome = self.updater.perform_ota_update(sink);
        sink.emit(&OtaEvent::CycleFinished(outcome));
        Some(outcome)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn updater(&self) -> &OtaUpdater<L, T, S, I, R> {
        &self.updater
    }

    pub fn updater_mut(&mut self) -> &mut OtaUpdater<L, T, S, I, R> {
        &mut self.updater
    }
}
