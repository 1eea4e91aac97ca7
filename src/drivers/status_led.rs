//! Single-colour status LED.
//!
//! Renders a [`Pattern`] by walking its step table on any
//! `embedded_hal` output pin. Rendering blocks for the pattern's duration;
//! it is the main loop's pacing between ticks as much as a display.
//!
//! On ESP-IDF the pin is a `PinDriver<Output>` and the delay is
//! `esp_idf_hal::delay::FreeRtos`; tests use a recording pin and a fake delay.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{trace, warn};

use crate::app::ports::StatusIndicator;

use super::led_patterns::Pattern;

pub struct BlinkLed<P, D> {
    pin: P,
    delay: D,
    pin_faulted: bool,
}

impl<P, D> BlinkLed<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            pin,
            delay,
            pin_faulted: false,
        }
    }

    /// Play one full rendering of `pattern`.
    pub fn render(&mut self, pattern: Pattern) {
        trace!("LED: {}", pattern.name());
        for step in pattern.steps() {
            let res = if step.on { self.pin.set_high() } else { self.pin.set_low() };
            if res.is_err() && !self.pin_faulted {
                warn!("Status LED pin write failed");
                self.pin_faulted = true;
            }
            self.delay.delay_ms(step.ms);
        }
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P, D> StatusIndicator for BlinkLed<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn signal(&mut self, pattern: Pattern) {
        self.render(pattern);
    }
}
