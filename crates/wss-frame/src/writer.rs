use std::io::{ErrorKind, Write};

use bytes::Bytes;

use crate::codec::{encode_command, Field};
use crate::command::CommandCode;
use crate::error::{FrameError, Result};

/// Sends whole command frames over a `Write` stream.
///
/// A frame is written completely and flushed before `send_command`
/// returns; short writes are continued and `Interrupted` is retried.
pub struct FrameWriter<T> {
    sink: T,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(sink: T) -> Self {
        Self { sink }
    }

    /// Encode a command and write it. Returns the bytes sent.
    ///
    /// Nothing reaches the stream when encoding fails.
    pub fn send_command(
        &mut self,
        message_id: u8,
        command: CommandCode,
        fields: &[Field],
    ) -> Result<Bytes> {
        let wire = encode_command(message_id, command, fields)?;
        self.write_raw(&wire)?;
        Ok(wire)
    }

    /// Write pre-encoded frame bytes and flush.
    pub fn write_raw(&mut self, wire: &[u8]) -> Result<()> {
        let mut rest = wire;
        while !rest.is_empty() {
            match self.sink.write(rest) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => rest = &rest[n..],
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        while let Err(err) = self.sink.flush() {
            if err.kind() != ErrorKind::Interrupted {
                return Err(FrameError::Io(err));
            }
        }
        Ok(())
    }

    pub fn get_ref(&self) -> &T {
        &self.sink
    }

    pub fn into_inner(self) -> T {
        self.sink
    }
}
