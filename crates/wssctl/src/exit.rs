use std::fmt;
use std::io;

use wss_driver::TransactionError;
use wss_frame::result_name;
use wss_transport::TransportError;

pub const SUCCESS: i32 = 0;
/// The command ran but the module reported a failed self-test or alarm.
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
/// The module answered with a non-zero result code.
pub const DEVICE_REJECTED: i32 = 40;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn io_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => TRANSPORT_ERROR,
    }
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match &err {
        TransportError::Io(source)
        | TransportError::Open { source, .. }
        | TransportError::Configure { source, .. } => io_code(source),
        TransportError::UnsupportedBaud(_) => USAGE,
        TransportError::Closed => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transaction_error(context: &str, err: TransactionError) -> CliError {
    match err {
        TransactionError::Transport(err) => transport_error(context, err),
        TransactionError::DeviceRejected(code) => CliError::new(
            DEVICE_REJECTED,
            format!("{context}: {err} ({})", result_name(code)),
        ),
        TransactionError::Malformed(_)
        | TransactionError::IdMismatch { .. }
        | TransactionError::UnexpectedLength { .. }
        | TransactionError::UnexpectedValue { .. }
        | TransactionError::ShapeMismatch { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        TransactionError::Encode(_)
        | TransactionError::UnknownRegister(_)
        | TransactionError::NotWritable(_)
        | TransactionError::NotReadable(_)
        | TransactionError::Scale(_) => CliError::usage(format!("{context}: {err}")),
        TransactionError::Poisoned => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_rejection_names_result_code() {
        let err = transaction_error("read failed", TransactionError::DeviceRejected(0x05));
        assert_eq!(err.code, DEVICE_REJECTED);
        assert!(err.message.contains("0x05"));
        assert!(err.message.contains(result_name(0x05)));
    }

    #[test]
    fn timeouts_map_to_124() {
        let io = io::Error::new(io::ErrorKind::TimedOut, "no reply");
        let err = transaction_error("read failed", TransactionError::Transport(io.into()));
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn open_failures_are_transport_errors() {
        let err = transport_error(
            "open failed",
            TransportError::Open {
                path: "/dev/ttyWSS0".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("open failed: "));
    }

    #[test]
    fn caller_mistakes_are_usage_errors() {
        let err = transaction_error(
            "read failed",
            TransactionError::UnknownRegister("nope".to_string()),
        );
        assert_eq!(err.code, USAGE);
        let err = transaction_error("write failed", TransactionError::NotWritable("vendor_name"));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn reply_problems_are_data_errors() {
        let err = transaction_error(
            "read failed",
            TransactionError::IdMismatch {
                sent: 1,
                received: 2,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
    }
}
