//! Scripted transport for exercising protocol code without hardware.
//!
//! [`ScriptedLink`] holds an ordered script of replies. Bytes written by the
//! host accumulate until `flush()`, which closes one request: the request is
//! logged, checked against the next script step, and that step's reply
//! becomes readable. Reading with nothing pending fails with `TimedOut`,
//! the same way an idle UART does.
//!
//! ```
//! use std::io::{Read, Write};
//! use wss_transport::mock::ScriptedLink;
//!
//! let mut link = ScriptedLink::new();
//! link.reply(&[0xDD, 0x01, 0x01, 0x02, 0x00, 0x03, 0xDD, 0x02]);
//! link.write_all(&[0x01]).unwrap();
//! link.flush().unwrap();
//!
//! let mut buf = [0u8; 16];
//! assert_eq!(link.read(&mut buf).unwrap(), 8);
//! ```

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::Duration;

use crate::error::Result;
use crate::traits::Transport;

#[derive(Debug, Clone)]
struct Step {
    /// Exact request expected, or `None` to accept any request.
    request: Option<Vec<u8>>,
    /// Bytes made readable once the request is flushed.
    reply: Vec<u8>,
}

/// A scripted, in-memory [`Transport`].
#[derive(Debug, Default)]
pub struct ScriptedLink {
    script: VecDeque<Step>,
    pending: VecDeque<u8>,
    current: Vec<u8>,
    sent: Vec<Vec<u8>>,
    chunk_size: Option<usize>,
    read_timeout: Option<Duration>,
    discards: usize,
}

impl ScriptedLink {
    /// Create an empty link. Every request is answered by silence until a
    /// step is scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver at most `size` bytes per `read()` call.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size.max(1));
        self
    }

    /// Answer the next request, whatever it is, with `reply`.
    pub fn reply(&mut self, reply: &[u8]) -> &mut Self {
        self.script.push_back(Step {
            request: None,
            reply: reply.to_vec(),
        });
        self
    }

    /// Expect exactly `request` next and answer it with `reply`.
    pub fn expect(&mut self, request: &[u8], reply: &[u8]) -> &mut Self {
        self.script.push_back(Step {
            request: Some(request.to_vec()),
            reply: reply.to_vec(),
        });
        self
    }

    /// Answer the next request with nothing, so the host read times out.
    pub fn silence(&mut self) -> &mut Self {
        self.reply(&[])
    }

    /// Make `bytes` readable immediately, ahead of any reply.
    pub fn inject(&mut self, bytes: &[u8]) -> &mut Self {
        self.pending.extend(bytes.iter().copied());
        self
    }

    /// Every request flushed so far, in order.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Number of script steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Number of bytes readable right now.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// How many times `discard_input` was called.
    pub fn discards(&self) -> usize {
        self.discards
    }

    /// The timeout most recently set through [`Transport::set_read_timeout`].
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }
}

impl Read for ScriptedLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "scripted link: no reply pending",
            ));
        }

        let limit = self.chunk_size.unwrap_or(usize::MAX).min(buf.len());
        let mut n = 0;
        while n < limit {
            match self.pending.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl Write for ScriptedLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.current.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.current.is_empty() {
            return Ok(());
        }

        let request = std::mem::take(&mut self.current);
        self.sent.push(request.clone());

        let Some(step) = self.script.pop_front() else {
            return Ok(());
        };
        if let Some(expected) = &step.request {
            if *expected != request {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("scripted link: expected request {expected:02X?}, got {request:02X?}"),
                ));
            }
        }
        self.pending.extend(step.reply);
        Ok(())
    }
}

impl Transport for ScriptedLink {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.read_timeout = timeout;
        Ok(())
    }

    fn discard_input(&mut self) -> Result<()> {
        self.pending.clear();
        self.discards += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_released_on_flush() {
        let mut link = ScriptedLink::new();
        link.reply(b"pong");

        let mut buf = [0u8; 8];
        assert_eq!(
            link.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::TimedOut
        );

        link.write_all(b"ping").unwrap();
        link.flush().unwrap();

        let n = link.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"pong");
        assert_eq!(link.sent(), &[b"ping".to_vec()]);
        assert_eq!(link.remaining(), 0);
    }

    #[test]
    fn unexpected_request_fails_flush() {
        let mut link = ScriptedLink::new();
        link.expect(b"abc", b"ok");

        link.write_all(b"xyz").unwrap();
        let err = link.flush().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(link.pending_len(), 0);
    }

    #[test]
    fn chunked_reads() {
        let mut link = ScriptedLink::new().with_chunk_size(1);
        link.inject(b"xy");

        let mut buf = [0u8; 8];
        assert_eq!(link.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'x');
        assert_eq!(link.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'y');
    }

    #[test]
    fn discard_drops_pending_bytes() {
        let mut link = ScriptedLink::new();
        link.inject(b"stale");
        link.discard_input().unwrap();

        assert_eq!(link.pending_len(), 0);
        assert_eq!(link.discards(), 1);
    }

    #[test]
    fn silence_yields_timeout() {
        let mut link = ScriptedLink::new();
        link.silence();
        link.write_all(b"req").unwrap();
        link.flush().unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(
            link.read(&mut buf).unwrap_err().kind(),
            io::ErrorKind::TimedOut
        );
    }
}
