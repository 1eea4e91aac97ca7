//! Modem bring-up: probe, echo, APN, radio on, attach check.
//!
//! Runs once after the power-enable pulse. Only a modem that never answers
//! the initial probe is treated as fatal; everything after that is logged
//! and left for the first HTTP session to discover.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::ports::Clock;
use crate::config::OtaConfig;
use crate::error::{OtaError, Result};

use super::at;
use super::channel::CommandChannel;
use super::link::SerialLink;

/// Radio-off settle before changing the PDP context.
const RADIO_OFF_SETTLE_MS: u32 = 2000;
/// Network registration time after radio-on.
const REGISTRATION_SETTLE_MS: u32 = 10_000;

pub fn bring_up<L, T>(channel: &mut CommandChannel<L, T>, config: &OtaConfig) -> Result<()>
where
    L: SerialLink,
    T: Clock + DelayNs,
{
    channel.drain();

    let timeout = config.command_timeout_ms;
    if channel.send(at::PROBE, timeout).is_empty() {
        warn!("Modem: no answer to probe");
        return Err(OtaError::Link);
    }

    let steps = [
        (String::from(at::ECHO_ON), 0),
        (String::from(at::RADIO_OFF), RADIO_OFF_SETTLE_MS),
        (at::define_pdp_context(&config.apn), 0),
        (String::from(at::RADIO_ON), REGISTRATION_SETTLE_MS),
    ];
    for (command, settle_ms) in steps {
        let result = channel.send(&command, timeout);
        if result.is_empty() || result.text().is_some_and(at::is_error) {
            warn!("Modem: '{}' failed, continuing", command);
        }
        channel.settle(settle_ms);
    }

    let attach = channel.send(at::ATTACH_STATUS, timeout);
    match attach.text().and_then(at::parse_attached) {
        Some(true) => info!("Modem: attached (APN {})", config.apn),
        Some(false) => warn!("Modem: not yet attached to packet service"),
        None => warn!("Modem: attach state unknown"),
    }
    Ok(())
}
