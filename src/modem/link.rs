//! Serial link abstraction: the byte pipe between MCU and modem.
//!
//! Concrete implementations:
//! - UART driver on ESP-IDF ([`UartLink`](crate::adapters::uart::UartLink))
//! - Scripted fake modems in the integration tests
//!
//! The [`CommandChannel`](super::channel::CommandChannel) is generic over
//! `SerialLink`, so a different modem wiring requires zero changes to the
//! session or lifecycle logic.

/// Half-duplex, unframed byte link.
pub trait SerialLink {
    /// Error type for this link.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the link.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}
