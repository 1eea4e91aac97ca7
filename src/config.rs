//! System configuration parameters
//!
//! All tunable parameters for the OTA client: server location, modem
//! timings, exchange profiles, and the on-device image slot paths.
//! Values can be overridden by a JSON file on the device filesystem
//! (see [`FileConfigStore`](crate::adapters::config_file::FileConfigStore)).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Settle delay and read deadline for one kind of HTTP exchange.
///
/// Download responses are much larger than version-check responses, so
/// they get a longer post-send settle and a longer read window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeProfile {
    /// Wait after the send command before issuing the read (milliseconds)
    pub send_settle_ms: u32,
    /// Deadline for the read-response command (milliseconds)
    pub read_timeout_ms: u32,
}

/// Core OTA configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtaConfig {
    // --- Server ---
    /// Base URL handed to the modem's HTTP context
    pub server_url: String,
    /// Request path for both check and download
    pub ota_path: String,

    // --- Modem ---
    /// Packet data APN configured during bring-up
    pub apn: String,
    /// Deadline for ordinary commands (milliseconds)
    pub command_timeout_ms: u32,
    /// Sleep between link polls while waiting for a response (milliseconds)
    pub poll_slice_ms: u32,
    /// Hard cap on bytes accumulated for a single response.
    ///
    /// This bounds the largest program a download can carry. `new_code` is
    /// hex of the program, and a `+CHTTPNMIC` body is hex again, so a
    /// download read costs about 4 bytes per program byte plus protocol
    /// lines: the 64 KiB default admits programs up to roughly 16 KB.
    pub max_response_bytes: usize,
    /// Settle after creating the HTTP context (milliseconds)
    pub create_settle_ms: u32,
    /// Settle after connecting the HTTP context (milliseconds)
    pub connect_settle_ms: u32,

    // --- Exchanges ---
    pub check: ExchangeProfile,
    pub download: ExchangeProfile,

    // --- Apply ---
    /// Wait between a successful swap and the restart (milliseconds)
    pub restart_settle_ms: u32,
    /// Boot slot: the program the device runs on startup
    pub boot_path: String,
    /// Backup slot: previous program, for manual recovery
    pub backup_path: String,
    /// Staging slot: candidate image awaiting verification
    pub staging_path: String,

    // --- Timing ---
    /// Main loop period (milliseconds)
    pub tick_period_ms: u32,
    /// Run an update cycle every N main loop ticks
    pub check_interval_ticks: u32,
}

impl Default for OtaConfig {
    fn default() -> Self {
        Self {
            // Server
            server_url: String::from("http://your-server.com"),
            ota_path: String::from("/ota"),

            // Modem
            apn: String::from("cmnbiot"),
            command_timeout_ms: 3000,
            poll_slice_ms: 10,
            max_response_bytes: 64 * 1024,
            create_settle_ms: 1000,
            connect_settle_ms: 2000,

            // Exchanges
            check: ExchangeProfile {
                send_settle_ms: 3000,
                read_timeout_ms: 3000,
            },
            download: ExchangeProfile {
                send_settle_ms: 5000,
                read_timeout_ms: 10_000,
            },

            // Apply
            restart_settle_ms: 3000,
            boot_path: String::from("/storage/main.bin"),
            backup_path: String::from("/storage/main_backup.bin"),
            staging_path: String::from("/storage/main_staged.bin"),

            // Timing
            tick_period_ms: 5000, // 1 tick / 5 s
            check_interval_ticks: 10,
        }
    }
}

impl OtaConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme_ok = self.server_url.starts_with("http://") || self.server_url.starts_with("https://");
        if !scheme_ok || self.server_url.contains('"') {
            return Err(ConfigError::ValidationFailed(
                "server_url must start with http:// or https:// and contain no quotes",
            ));
        }
        if !self.ota_path.starts_with('/') || self.ota_path.contains('"') {
            return Err(ConfigError::ValidationFailed(
                "ota_path must start with '/' and contain no quotes",
            ));
        }
        if self.apn.is_empty() || self.apn.contains('"') {
            return Err(ConfigError::ValidationFailed(
                "apn must be non-empty and contain no quotes",
            ));
        }
        if !(100..=60_000).contains(&self.command_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "command_timeout_ms must be 100–60000",
            ));
        }
        if !(1..=1000).contains(&self.poll_slice_ms) || self.poll_slice_ms >= self.command_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "poll_slice_ms must be 1–1000 and below command_timeout_ms",
            ));
        }
        if !(256..=1024 * 1024).contains(&self.max_response_bytes) {
            return Err(ConfigError::ValidationFailed(
                "max_response_bytes must be 256–1048576",
            ));
        }
        if self.download.read_timeout_ms < self.check.read_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "download read timeout must not be shorter than check read timeout",
            ));
        }
        if self.check_interval_ticks == 0 || self.tick_period_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "tick_period_ms and check_interval_ticks must be non-zero",
            ));
        }
        let slots = [&self.boot_path, &self.backup_path, &self.staging_path];
        if slots.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::ValidationFailed("slot paths must be non-empty"));
        }
        if self.boot_path == self.backup_path
            || self.boot_path == self.staging_path
            || self.backup_path == self.staging_path
        {
            return Err(ConfigError::ValidationFailed("slot paths must be distinct"));
        }
        Ok(())
    }
}
