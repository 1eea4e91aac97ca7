//! Chip restart adapter.
//!
//! Implements [`SystemControl`]. On ESP-IDF `restart` resets the chip and
//! never returns; the simulation backend only counts requests.

use log::warn;

use crate::app::ports::SystemControl;

#[derive(Debug, Default)]
pub struct EspSystem {
    #[cfg(not(target_os = "espidf"))]
    restarts: u32,
}

impl EspSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart requests seen by the simulation backend.
    #[cfg(not(target_os = "espidf"))]
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

impl SystemControl for EspSystem {
    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        warn!("System restart requested");
        // SAFETY: esp_restart is always safe to call; it does not return.
        unsafe { esp_idf_svc::sys::esp_restart() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        warn!("System restart requested (simulated)");
        self.restarts += 1;
    }
}
