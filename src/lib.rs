//! CellOTA firmware library.
//!
//! Fetches new program images over a SIM7020-class cellular modem and
//! installs them with a staged, checksummed swap. Exposes the pure-logic
//! modules for integration testing; all ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod modem;
pub mod ota;

pub mod adapters;
pub mod drivers;
