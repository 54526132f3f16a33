//! Transport boundary for WSS modules.
//!
//! The protocol core only needs a half-duplex byte stream: write a frame,
//! read a frame back within a timeout. This crate defines that capability
//! as the [`Transport`] trait and provides:
//! - [`SerialDevice`], a thin adapter over a UART device node (Unix)
//! - [`mock::ScriptedLink`], a scripted link for tests (behind `mock`)

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod serial;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{Result, TransportError};
pub use traits::Transport;

#[cfg(unix)]
pub use serial::{LineSettings, Parity, SerialDevice};

/// Line rate the WSS UART runs at.
pub const DEFAULT_BAUD: u32 = 115_200;
