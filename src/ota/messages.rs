//! Wire schema shared with the update server.
//!
//! Requests are serialized to JSON and hex-encoded into a POST command
//! line. Responses are pulled out of noisy modem text by
//! [`envelope::extract`](super::envelope::extract). Unknown fields are
//! ignored in both directions so the server can grow its schema.

use serde::{Deserialize, Serialize};

/// Compile-time version of the running program.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Who is asking. Fixed for the lifetime of one program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub firmware_version: String,
}

impl DeviceIdentity {
    /// Identity for this build, with the given device id.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            firmware_version: String::from(FIRMWARE_VERSION),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CheckUpdate,
    DownloadUpdate,
}

// ── Requests ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UpdateCheckRequest<'a> {
    pub device_id: &'a str,
    pub current_version: &'a str,
    pub action: Action,
}

impl<'a> UpdateCheckRequest<'a> {
    pub fn new(identity: &'a DeviceIdentity) -> Self {
        Self {
            device_id: &identity.device_id,
            current_version: &identity.firmware_version,
            action: Action::CheckUpdate,
        }
    }
}

/// Download request. `current_version` lets the server pick the next
/// image for this device.
#[derive(Debug, Serialize)]
pub struct UpdateFetchRequest<'a> {
    pub device_id: &'a str,
    pub current_version: &'a str,
    pub action: Action,
}

impl<'a> UpdateFetchRequest<'a> {
    pub fn new(identity: &'a DeviceIdentity) -> Self {
        Self {
            device_id: &identity.device_id,
            current_version: &identity.firmware_version,
            action: Action::DownloadUpdate,
        }
    }
}

// ── Responses ─────────────────────────────────────────────────

/// `update_available` is required: an object without it is not a check
/// response, whatever else it contains.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateCheckResponse {
    pub update_available: bool,
    #[serde(default)]
    pub new_version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateFetchResponse {
    /// Absent means success; only an explicit `false` is a refusal.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Hex-encoded program text.
    #[serde(default)]
    pub new_code: Option<String>,
    /// Hex SHA-256 of the decoded program.
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl UpdateFetchResponse {
    pub fn refused(&self) -> bool {
        self.success == Some(false)
    }
}
