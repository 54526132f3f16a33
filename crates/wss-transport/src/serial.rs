use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::Transport;
use crate::DEFAULT_BAUD;

/// Default per-read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Parity setting for the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Serial line configuration. Defaults to 115200 baud, 8N1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSettings {
    pub baud: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
    /// `None` blocks until at least one byte arrives.
    pub read_timeout: Option<Duration>,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            baud: DEFAULT_BAUD,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}

/// A UART device node configured for raw, half-duplex use.
///
/// Reads that expire the line timeout fail with `ErrorKind::TimedOut`.
pub struct SerialDevice {
    file: File,
    path: PathBuf,
    settings: LineSettings,
}

impl SerialDevice {
    /// Open a device node (e.g. `/dev/ttyS1`) and apply `settings`.
    pub fn open(path: impl AsRef<Path>, settings: LineSettings) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        let device = Self {
            file,
            path,
            settings,
        };
        device.apply_settings()?;

        info!(
            path = ?device.path,
            baud = device.settings.baud,
            "opened serial device"
        );
        Ok(device)
    }

    /// The device path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The line settings currently applied.
    pub fn settings(&self) -> &LineSettings {
        &self.settings
    }

    fn apply_settings(&self) -> Result<()> {
        let speed = baud_constant(self.settings.baud)?;
        let size = data_bits_flag(self.settings.data_bits).ok_or_else(|| {
            self.configure_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported data bits: {}", self.settings.data_bits),
            ))
        })?;
        if !matches!(self.settings.stop_bits, 1 | 2) {
            return Err(self.configure_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported stop bits: {}", self.settings.stop_bits),
            )));
        }

        let fd = self.file.as_raw_fd();

        // SAFETY: termios is plain old data; an all-zero value is a valid
        // starting point that tcgetattr overwrites.
        let mut tio: libc::termios = unsafe { std::mem::zeroed() };

        // SAFETY: `fd` is an open descriptor owned by `self.file` and `tio`
        // is a valid, writable termios.
        if unsafe { libc::tcgetattr(fd, &mut tio) } != 0 {
            return Err(self.configure_error(io::Error::last_os_error()));
        }

        // SAFETY: `tio` is a valid termios initialized by tcgetattr.
        unsafe { libc::cfmakeraw(&mut tio) };

        tio.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::PARODD | libc::CSTOPB);
        tio.c_cflag |= libc::CREAD | libc::CLOCAL | size;
        match self.settings.parity {
            Parity::None => {}
            Parity::Even => tio.c_cflag |= libc::PARENB,
            Parity::Odd => tio.c_cflag |= libc::PARENB | libc::PARODD,
        }
        if self.settings.stop_bits == 2 {
            tio.c_cflag |= libc::CSTOPB;
        }

        let (vmin, vtime) = read_timing(self.settings.read_timeout);
        tio.c_cc[libc::VMIN] = vmin;
        tio.c_cc[libc::VTIME] = vtime;

        // SAFETY: `tio` is valid; `speed` is one of the libc B* constants.
        let rc = unsafe {
            libc::cfsetispeed(&mut tio, speed) | libc::cfsetospeed(&mut tio, speed)
        };
        if rc != 0 {
            return Err(self.configure_error(io::Error::last_os_error()));
        }

        // SAFETY: `fd` is open and `tio` is fully initialized.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tio) } != 0 {
            return Err(self.configure_error(io::Error::last_os_error()));
        }

        debug!(path = ?self.path, vmin, vtime, "applied line settings");
        Ok(())
    }

    fn configure_error(&self, source: io::Error) -> TransportError {
        TransportError::Configure {
            path: self.path.clone(),
            source,
        }
    }
}

impl Read for SerialDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.file.read(buf)?;
        if n == 0 && !buf.is_empty() && self.settings.read_timeout.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "serial read timed out",
            ));
        }
        Ok(n)
    }
}

impl Write for SerialDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        // SAFETY: the descriptor is owned by `self.file` and stays open.
        if unsafe { libc::tcdrain(self.file.as_raw_fd()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Transport for SerialDevice {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.settings.read_timeout = timeout;
        self.apply_settings()
    }

    fn discard_input(&mut self) -> Result<()> {
        // SAFETY: the descriptor is owned by `self.file` and stays open.
        if unsafe { libc::tcflush(self.file.as_raw_fd(), libc::TCIFLUSH) } != 0 {
            return Err(TransportError::Io(io::Error::last_os_error()));
        }
        debug!(path = ?self.path, "discarded pending input");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl std::fmt::Debug for SerialDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialDevice")
            .field("path", &self.path)
            .field("settings", &self.settings)
            .finish()
    }
}

fn baud_constant(baud: u32) -> Result<libc::speed_t> {
    let speed = match baud {
        9_600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        other => return Err(TransportError::UnsupportedBaud(other)),
    };
    Ok(speed)
}

fn data_bits_flag(bits: u8) -> Option<libc::tcflag_t> {
    match bits {
        5 => Some(libc::CS5),
        6 => Some(libc::CS6),
        7 => Some(libc::CS7),
        8 => Some(libc::CS8),
        _ => None,
    }
}

/// VMIN/VTIME pair for a read timeout. VTIME counts tenths of a second.
fn read_timing(timeout: Option<Duration>) -> (libc::cc_t, libc::cc_t) {
    match timeout {
        None => (1, 0),
        Some(timeout) => {
            let tenths = timeout.as_millis().div_ceil(100).clamp(1, 255);
            (0, tenths as libc::cc_t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_115200_8n1() {
        let settings = LineSettings::default();
        assert_eq!(settings.baud, 115_200);
        assert_eq!(settings.data_bits, 8);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.stop_bits, 1);
    }

    #[test]
    fn read_timing_rounds_up_to_tenths() {
        assert_eq!(read_timing(None), (1, 0));
        assert_eq!(read_timing(Some(Duration::from_millis(1))), (0, 1));
        assert_eq!(read_timing(Some(Duration::from_millis(250))), (0, 3));
        assert_eq!(read_timing(Some(Duration::from_secs(1))), (0, 10));
        assert_eq!(read_timing(Some(Duration::from_secs(60))), (0, 255));
    }

    #[test]
    fn unsupported_baud_rejected() {
        assert!(matches!(
            baud_constant(12_345),
            Err(TransportError::UnsupportedBaud(12_345))
        ));
        assert!(baud_constant(DEFAULT_BAUD).is_ok());
    }

    #[test]
    fn data_bits_range() {
        assert!(data_bits_flag(8).is_some());
        assert!(data_bits_flag(5).is_some());
        assert!(data_bits_flag(9).is_none());
    }

    #[test]
    fn open_missing_device_reports_path() {
        let path = std::env::temp_dir().join(format!("wss-missing-tty-{}", std::process::id()));
        let err = SerialDevice::open(&path, LineSettings::default()).unwrap_err();
        match err {
            TransportError::Open { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn regular_file_cannot_be_configured() {
        let path = std::env::temp_dir().join(format!("wss-not-a-tty-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();

        let err = SerialDevice::open(&path, LineSettings::default()).unwrap_err();
        assert!(matches!(err, TransportError::Configure { .. }));

        let _ = std::fs::remove_file(&path);
    }
}
