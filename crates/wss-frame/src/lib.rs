//! Frame codec for the WSS serial protocol.
//!
//! Every frame on the wire is delimited and checksummed:
//! - A 2-byte start marker (`DD 01`) and end marker (`DD 02`)
//! - A message id echoed by the module in its reply
//! - A 1-byte length covering the code byte through the checksum
//! - An XOR checksum over message id, length, code and body
//!
//! Commands carry (object, instance, parameter[, data]) groups; replies
//! carry a result code and a register-specific payload.

pub mod codec;
pub mod command;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    checksum, decode, encode_command, encode_frame, encode_response, Address, Field, Frame,
    FrameConfig, Parameter, END, FRAME_OVERHEAD, HEADER_SIZE, MAX_BODY_LEN, MAX_FRAME_LEN,
    MIN_COMMAND_LEN, MIN_FRAME_LEN, START,
};
pub use command::{result_name, CommandCode, RESULT_SUCCESS};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
