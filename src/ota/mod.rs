//! Over-the-air update lifecycle.
//!
//! - [`messages`] — request/response schema shared with the server
//! - [`envelope`] — JSON extraction from noisy modem text
//! - [`image`] — staged, checksummed install into the boot slot
//! - [`lifecycle`] — check / fetch / apply orchestration

pub mod envelope;
pub mod image;
pub mod lifecycle;
pub mod messages;
