//! Modem power-enable line.
//!
//! The SIM7020 module powers up from its enable pin going high; the
//! firmware must not talk to it until the boot settle has passed.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::error::{OtaError, Result};

/// Modem boot time after the enable line goes high.
pub const POWER_ON_SETTLE_MS: u32 = 2000;

/// Drive the enable pin high and wait for the modem to boot.
pub fn power_on<P: OutputPin>(pin: &mut P, delay: &mut impl DelayNs) -> Result<()> {
    if let Err(e) = pin.set_high() {
        warn!("Modem enable pin write failed: {:?}", e);
        return Err(OtaError::Link);
    }
    delay.delay_ms(POWER_ON_SETTLE_MS);
    info!("Modem powered on");
    Ok(())
}
