//! Outbound application events.
//!
//! The [`OtaUpdater`](crate::ota::lifecycle::OtaUpdater) and
//! [`OtaService`](super::service::OtaService) emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them.

use crate::error::{ApplyError, OtaError};
use crate::ota::image::Applied;
use crate::ota::lifecycle::CycleOutcome;

/// Structured events emitted by the update core.
#[derive(Debug, Clone, PartialEq)]
pub enum OtaEvent {
    /// The service has started (carries the running identity).
    Started {
        device_id: String,
        firmware_version: String,
    },

    /// A version check is about to run.
    CheckStarted,

    /// The server answered and has nothing newer.
    UpToDate { message: Option<String> },

    /// The check exchange or its response was unusable. Treated as
    /// "no update" for this cycle; the reason is kept for diagnosis.
    CheckFailed(OtaError),

    /// The server offered a newer program.
    UpdateAvailable {
        version: Option<String>,
        description: Option<String>,
    },

    /// The new program arrived and decoded cleanly.
    Downloaded { bytes: usize },

    /// The download exchange or its payload was unusable.
    FetchFailed(OtaError),

    /// The new program is in the boot slot.
    Applied(Applied),

    /// The new program could not be committed; the old one keeps running.
    ApplyFailed(ApplyError),

    /// A restart into the new program is being requested.
    Restarting,

    /// One full check → fetch → apply cycle finished.
    CycleFinished(CycleOutcome),
}
