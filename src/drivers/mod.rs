//! Board drivers: status LED and modem power.

pub mod led_patterns;
pub mod modem_power;
pub mod status_led;
