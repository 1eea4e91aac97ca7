//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing OTA events to the ESP-IDF logger
//! (UART / USB-CDC in production). A telemetry uplink would implement the
//! same trait.

use log::{error, info, warn};

use crate::app::events::OtaEvent;
use crate::app::ports::EventSink;
use crate::ota::lifecycle::CycleOutcome;

/// Adapter that logs every [`OtaEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &OtaEvent) {
        match event {
            OtaEvent::Started {
                device_id,
                firmware_version,
            } => {
                info!("START | device={} version={}", device_id, firmware_version);
            }
            OtaEvent::CheckStarted => info!("CHECK | asking server"),
            OtaEvent::UpToDate { message } => {
                info!("CHECK | up to date ({})", message.as_deref().unwrap_or("-"));
            }
            OtaEvent::CheckFailed(e) => warn!("CHECK | failed: {}", e),
            OtaEvent::UpdateAvailable { version, description } => {
                info!(
                    "CHECK | update {} available: {}",
                    version.as_deref().unwrap_or("?"),
                    description.as_deref().unwrap_or("-")
                );
            }
            OtaEvent::Downloaded { bytes } => info!("FETCH | {} bytes", bytes),
            OtaEvent::FetchFailed(e) => warn!("FETCH | failed: {}", e),
            OtaEvent::Applied(a) => {
                info!(
                    "APPLY | {} bytes installed, backup={}",
                    a.bytes,
                    if a.backup_saved { "OK" } else { "NONE" }
                );
            }
            OtaEvent::ApplyFailed(e) => error!("APPLY | failed: {}", e),
            OtaEvent::Restarting => warn!("APPLY | restarting"),
            OtaEvent::CycleFinished(outcome) => match outcome {
                CycleOutcome::NoUpdate => info!("CYCLE | no update"),
                CycleOutcome::Applied(_) => info!("CYCLE | update applied"),
                CycleOutcome::Failed(e) => warn!("CYCLE | failed: {}", e),
            },
        }
    }
}
