//! Unified error types for the OTA firmware.
//!
//! A single [`OtaError`] enum that every layer of the update path can
//! convert into. All variants are `Copy` so they can be carried inside
//! events and cycle outcomes without allocation.
//!
//! Propagation policy:
//!
//! - [`OtaError::Link`] and [`OtaError::Timeout`] are absorbed at the
//!   channel/session boundary and surface only as "no data".
//! - [`OtaError::Decode`] and [`OtaError::Schema`] are absorbed by the
//!   lifecycle and surface as "no update" / "fetch failed".
//! - [`OtaError::Apply`] is the only operator-visible failure.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level OTA error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaError {
    /// Writing to or reading from the serial link failed, or the modem
    /// rejected a command.
    Link,
    /// No usable response arrived within the deadline.
    Timeout,
    /// Bytes were not valid text, or the hex codec could not undo them.
    Decode,
    /// The decoded text held no parsable JSON object of the expected shape.
    Schema,
    /// The new image could not be committed to the boot slot.
    Apply(ApplyError),
}

impl fmt::Display for OtaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link => write!(f, "link failure"),
            Self::Timeout => write!(f, "no response before deadline"),
            Self::Decode => write!(f, "payload could not be decoded"),
            Self::Schema => write!(f, "response did not match schema"),
            Self::Apply(e) => write!(f, "apply: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Apply errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyError {
    /// Refused to install a zero-length program.
    EmptyImage,
    /// The candidate could not be written to the staging slot.
    StageWriteFailed,
    /// The staged copy did not hash to the downloaded program.
    ChecksumMismatch,
    /// Swapping the staged image into the boot slot failed.
    PromoteFailed,
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyImage => write!(f, "refusing to install empty image"),
            Self::StageWriteFailed => write!(f, "staging write failed"),
            Self::ChecksumMismatch => write!(f, "staged image checksum mismatch"),
            Self::PromoteFailed => write!(f, "boot slot swap failed"),
        }
    }
}

impl From<ApplyError> for OtaError {
    fn from(e: ApplyError) -> Self {
        Self::Apply(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, OtaError>;
