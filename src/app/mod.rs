//! Application core: the periodic update service and its port boundary.
//!
//! The update logic itself lives in [`crate::ota`]; this module holds the
//! scheduling service that drives it from the main loop, the events it
//! emits, and the **port traits** in [`ports`] that keep the domain fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
