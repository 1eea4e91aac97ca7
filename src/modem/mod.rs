//! Modem transport stack.
//!
//! A software HTTP client made entirely of AT command/response pairs over
//! an unframed serial link.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Modem Stack                           │
//! │                                                          │
//! │  ┌──────────┐   ┌───────────┐   ┌──────────────────────┐ │
//! │  │ Session  │──▶│  Channel  │──▶│ SerialLink (trait)   │ │
//! │  │ (AT-HTTP)│   │ (cmd+wait)│   │ UART / fake          │ │
//! │  └──────────┘   └───────────┘   └──────────────────────┘ │
//! │       │                                                  │
//! │       ▼                                                  │
//! │  ┌──────────┐   ┌───────────┐                            │
//! │  │  Codec   │   │  AT verbs │                            │
//! │  │  (hex)   │   │ + scanners│                            │
//! │  └──────────┘   └───────────┘                            │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod at;
pub mod channel;
pub mod codec;
pub mod link;
pub mod session;
pub mod setup;
