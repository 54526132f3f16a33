use std::io::{ErrorKind, Read};

use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use crate::codec::{FrameConfig, FRAME_OVERHEAD, HEADER_SIZE, MAX_FRAME_LEN, START};
use crate::error::{FrameError, Result};

/// Pulls one raw frame at a time out of a `Read` stream.
///
/// Bytes ahead of a start marker are skipped, so a reader recovers from
/// line noise or the tail of a reply that arrived after its request timed
/// out. Only the bytes of the current frame are taken from the stream.
/// The returned bytes are not validated; pass them to [`crate::decode`].
pub struct FrameReader<T> {
    source: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    pub fn new(source: T) -> Self {
        Self::with_config(source, FrameConfig::default())
    }

    pub fn with_config(source: T, config: FrameConfig) -> Self {
        Self { source, config }
    }

    /// Read the next raw frame, blocking until it is complete.
    ///
    /// End of stream before a full frame is `ConnectionClosed`; a read
    /// timeout surfaces as `Io` with the transport's error kind.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(MAX_FRAME_LEN);
        let mut chunk = [0u8; MAX_FRAME_LEN];
        let mut discarded = 0usize;

        loop {
            discarded += align_to_start(&mut buf);
            if discarded > self.config.max_discard {
                return Err(FrameError::SyncLost { discarded });
            }

            // The length byte sits at offset 3 and counts everything
            // between itself and the end marker.
            let wanted = match buf.get(3) {
                Some(&len) => FRAME_OVERHEAD + usize::from(len),
                None => HEADER_SIZE,
            };
            if buf.len() >= wanted {
                if discarded > 0 {
                    trace!(discarded, "skipped bytes before start marker");
                }
                return Ok(buf.split_to(wanted).freeze());
            }

            let missing = wanted - buf.len();
            match self.source.read(&mut chunk[..missing]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.source
    }

    pub fn into_inner(self) -> T {
        self.source
    }
}

/// Drop everything before the first start marker. A lone trailing `DD`
/// is kept, since it may be the first half of a marker. Returns the
/// number of bytes dropped.
fn align_to_start(buf: &mut BytesMut) -> usize {
    if buf.starts_with(&START) {
        return 0;
    }
    let skip = match buf.windows(START.len()).position(|w| w == START) {
        Some(pos) => pos,
        None if buf.last() == Some(&START[0]) => buf.len() - 1,
        None => buf.len(),
    };
    buf.advance(skip);
    skip
}
