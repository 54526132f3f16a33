use crate::command::CommandCode;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A start or end marker is missing or has the wrong value.
    #[error("bad frame marker at offset {offset}: expected {expected:02X?}, found {found:02X?}")]
    BadMarker {
        offset: usize,
        expected: [u8; 2],
        found: [u8; 2],
    },

    /// The length byte disagrees with the number of bytes received.
    #[error("length field declares a {declared}-byte frame, got {actual} bytes")]
    LengthMismatch { declared: usize, actual: usize },

    /// Fewer bytes than the smallest frame, or than the length byte declares.
    #[error("truncated frame: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    /// The checksum byte does not match the XOR of the frame contents.
    #[error("checksum mismatch: computed 0x{computed:02X}, frame carries 0x{carried:02X}")]
    ChecksumMismatch { computed: u8, carried: u8 },

    /// The body does not fit the 1-byte length field.
    #[error("frame body too long ({size} bytes, max {max})")]
    BodyTooLong { size: usize, max: usize },

    /// The fields do not fit the shape the command code requires.
    #[error("invalid fields for {command} command: {reason}")]
    InvalidFields {
        command: CommandCode,
        reason: &'static str,
    },

    /// No start marker was found within the configured discard budget.
    #[error("lost frame sync: discarded {discarded} bytes without a start marker")]
    SyncLost { discarded: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
