//! Command and result codes.
//!
//! The byte after the length field is a command code in host frames and a
//! result code in module replies.

use std::fmt;

/// Result code of a successful reply.
pub const RESULT_SUCCESS: u8 = 0x00;

/// Command codes understood by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandCode {
    /// Single register write.
    Write = 0x01,
    /// One or more register reads.
    Read = 0x02,
    /// Repeated writes to parameters of one object.
    ArrayWrite = 0x10,
    /// Writes spanning several objects, applied together.
    MultiObjectWrite = 0x11,
}

impl CommandCode {
    /// The wire value.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parse a wire value.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(CommandCode::Write),
            0x02 => Some(CommandCode::Read),
            0x10 => Some(CommandCode::ArrayWrite),
            0x11 => Some(CommandCode::MultiObjectWrite),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            CommandCode::Write => "write",
            CommandCode::Read => "read",
            CommandCode::ArrayWrite => "array-write",
            CommandCode::MultiObjectWrite => "multi-object-write",
        }
    }

    /// Returns true for every code that carries data bytes.
    pub fn is_write(self) -> bool {
        !matches!(self, CommandCode::Read)
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns a human-readable name for a reply result code.
pub fn result_name(code: u8) -> &'static str {
    match code {
        RESULT_SUCCESS => "success",
        0x01 => "failed",
        0x02 => "unknown object",
        0x03 => "unknown instance",
        0x04 => "unknown parameter",
        0x05 => "read only",
        0x06 => "value out of range",
        0x07 => "busy",
        _ => "unknown",
    }
}
