use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;

/// A half-duplex byte link to one WSS module.
///
/// Implementors are plain blocking streams. A read that hits the link
/// timeout must fail with [`std::io::ErrorKind::TimedOut`] rather than
/// return `Ok(0)`, which is reserved for a closed link.
pub trait Transport: Read + Write {
    /// Set the timeout applied to each blocking read.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;

    /// Drop any bytes already received but not yet read.
    ///
    /// Called before the next request once the framing state of the line
    /// is unknown (after a timeout or a stale reply).
    fn discard_input(&mut self) -> Result<()>;

    /// Short name for diagnostics.
    fn describe(&self) -> String {
        "transport".to_string()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        (**self).set_read_timeout(timeout)
    }

    fn discard_input(&mut self) -> Result<()> {
        (**self).discard_input()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        (**self).set_read_timeout(timeout)
    }

    fn discard_input(&mut self) -> Result<()> {
        (**self).discard_input()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
