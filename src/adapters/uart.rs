//! UART link to the cellular modem.
//!
//! Implements [`SerialLink`] over the ESP-IDF UART driver.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: wraps `esp_idf_hal::uart::UartDriver`.
//!   Reads never block; the command channel does its own pacing.
//! - **all other targets**: an in-memory loopback that records writes and
//!   serves bytes queued with [`UartLink::inject`], for host-side runs.

use core::fmt;

use crate::modem::link::SerialLink;

/// Baud rate of the SIM7020 AT port.
pub const MODEM_BAUD: u32 = 115_200;

/// Errors originating from the UART layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartError {
    /// Driver-level read/write failure (carries the ESP-IDF error code).
    Io(i32),
}

impl fmt::Display for UartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(code) => write!(f, "UART I/O error {}", code),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct UartLink<'d> {
    uart: esp_idf_hal::uart::UartDriver<'d>,
}

#[cfg(target_os = "espidf")]
impl<'d> UartLink<'d> {
    pub fn new(uart: esp_idf_hal::uart::UartDriver<'d>) -> Self {
        log::info!("UartLink: modem UART ready at {} baud", MODEM_BAUD);
        Self { uart }
    }
}

#[cfg(target_os = "espidf")]
impl SerialLink for UartLink<'_> {
    type Error = UartError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, UartError> {
        self.uart
            .read(buf, esp_idf_hal::delay::NON_BLOCK)
            .map_err(|e| UartError::Io(e.code()))
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, UartError> {
        self.uart.write(data).map_err(|e| UartError::Io(e.code()))
    }

    fn flush(&mut self) -> Result<(), UartError> {
        self.uart
            .wait_tx_done(esp_idf_hal::delay::BLOCK)
            .map_err(|e| UartError::Io(e.code()))
    }

    fn available(&self) -> bool {
        self.uart.remaining_read().map(|n| n > 0).unwrap_or(false)
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation implementation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct UartLink {
    tx: Vec<u8>,
    rx: std::collections::VecDeque<u8>,
}

#[cfg(not(target_os = "espidf"))]
impl UartLink {
    pub fn new() -> Self {
        log::info!("UartLink: simulation loopback at {} baud", MODEM_BAUD);
        Self::default()
    }

    /// Queue bytes as if the modem had sent them.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Everything written so far.
    pub fn sent(&self) -> &[u8] {
        &self.tx
    }
}

#[cfg(not(target_os = "espidf"))]
impl SerialLink for UartLink {
    type Error = UartError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, UartError> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, UartError> {
        self.tx.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), UartError> {
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx.is_empty()
    }
}
