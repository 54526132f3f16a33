use std::path::PathBuf;

/// Errors that can occur on the link to a WSS module.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to apply line settings to the serial device.
    #[error("failed to configure {path}: {source}")]
    Configure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested baud rate has no termios equivalent.
    #[error("unsupported baud rate: {0}")]
    UnsupportedBaud(u32),

    /// An I/O error occurred on the link (including read timeouts).
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link was closed by the other end.
    #[error("link closed")]
    Closed,
}

impl TransportError {
    /// Returns true when the error is a read or write timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
