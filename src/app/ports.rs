//! Port traits — the hexagonal boundary between the update logic and the device.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ OtaUpdater / OtaService (domain)
//! ```
//!
//! Driven adapters (clock, image storage, restart, status LED, event sinks,
//! config storage) implement these traits. The serial link has its own
//! trait in [`modem::link`](crate::modem::link) next to the channel that
//! drives it.
//!
//! ## Storage notes
//!
//! - **ImageStore** implementations MUST make `promote_staged` atomic: after
//!   a power loss the boot slot holds either the old or the new image,
//!   never a mix. A filesystem rename satisfies this.
//! - All port errors are typed; callers must handle every variant explicitly.

use crate::app::events::OtaEvent;
use crate::config::OtaConfig;
use crate::drivers::led_patterns::Pattern;

// ───────────────────────────────────────────────────────────────
// Clock port (monotonic time source)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
///
/// Paired with [`embedded_hal::delay::DelayNs`] wherever the domain needs
/// to wait: the command channel polls against this clock and sleeps with
/// the delay.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed epoch (usually boot).
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Image store port (domain ↔ flash filesystem)
// ───────────────────────────────────────────────────────────────

/// One of the three program image locations on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The program the device executes on startup.
    Boot,
    /// The previously active program, kept for manual recovery.
    Backup,
    /// A downloaded candidate awaiting verification.
    Staging,
}

/// Persistent program image storage.
pub trait ImageStore {
    /// Read the full contents of a slot.
    fn read(&self, slot: Slot) -> Result<Vec<u8>, StoreError>;

    /// Replace the contents of a slot.
    fn write(&mut self, slot: Slot, data: &[u8]) -> Result<(), StoreError>;

    /// Remove a slot's contents. Returns `Ok(())` if it was already empty.
    fn discard(&mut self, slot: Slot) -> Result<(), StoreError>;

    /// Atomically replace the boot slot with the staging slot.
    /// The staging slot is empty afterwards.
    fn promote_staged(&mut self) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// System control port (domain → chip reset)
// ───────────────────────────────────────────────────────────────

pub trait SystemControl {
    /// Full device restart. On hardware this never returns.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Status indicator port (domain → operator-visible LED)
// ───────────────────────────────────────────────────────────────

/// Binary side channel that renders a small fixed set of named patterns.
pub trait StatusIndicator {
    fn signal(&mut self, pattern: Pattern);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`OtaEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &OtaEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads system configuration.
///
/// Implementations MUST run [`OtaConfig::validate`] before handing a
/// stored config to the caller.
pub trait ConfigPort {
    fn load(&self) -> Result<OtaConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`ImageStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The slot holds no image.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "slot empty"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
