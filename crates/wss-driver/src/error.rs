use wss_frame::FrameError;
use wss_transport::TransportError;

use crate::scale::ScaleError;

/// Errors surfaced by a request/response exchange.
///
/// Nothing here is retried internally; callers decide whether to retry.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The request could not be encoded.
    #[error("cannot encode request: {0}")]
    Encode(#[source] FrameError),

    /// The reply failed structural validation.
    #[error("malformed reply: {0}")]
    Malformed(#[source] FrameError),

    /// The reply carries another request's message id.
    #[error("message id mismatch: sent 0x{sent:02X}, reply carries 0x{received:02X}")]
    IdMismatch { sent: u8, received: u8 },

    /// The module answered with a non-zero result code.
    #[error("module rejected request with result code 0x{0:02X}")]
    DeviceRejected(u8),

    /// The reply payload length differs from what the register defines.
    #[error("unexpected reply length: expected {expected} bytes, got {actual}")]
    UnexpectedLength { expected: usize, actual: usize },

    /// Sending or receiving failed, including read timeouts.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The register returned a value outside its closed set.
    #[error("register {register} returned unexpected value 0x{raw:04X}")]
    UnexpectedValue { register: &'static str, raw: u16 },

    /// The catalog shape of a register does not fit the accessor reading it.
    #[error("register {register} does not decode to {expected}")]
    ShapeMismatch {
        register: &'static str,
        expected: &'static str,
    },

    /// No register with that name exists.
    #[error("unknown register: {0}")]
    UnknownRegister(String),

    /// The register does not accept writes.
    #[error("register {0} is read-only")]
    NotWritable(&'static str),

    /// The register only accepts writes.
    #[error("register {0} is write-only")]
    NotReadable(&'static str),

    /// A physical value could not be converted to its wire form.
    #[error("invalid value: {0}")]
    Scale(#[from] ScaleError),

    /// Another thread panicked while holding the port.
    #[error("port lock poisoned")]
    Poisoned,
}

impl TransactionError {
    /// True when the line may still carry bytes from this exchange, so the
    /// next request must resynchronize first.
    pub fn desynchronizes(&self) -> bool {
        matches!(
            self,
            TransactionError::Transport(_)
                | TransactionError::Malformed(_)
                | TransactionError::IdMismatch { .. }
        )
    }

    /// True for read timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransactionError::Transport(err) if err.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, TransactionError>;
