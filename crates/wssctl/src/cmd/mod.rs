use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use tracing::debug;
use wss_driver::{BootMode, ChannelRoute, FirmwareAction, Port, PortConfig};
use wss_transport::Transport;

use crate::exit::{transaction_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod alarms;
pub mod boot_mode;
pub mod catalog;
pub mod encode;
pub mod firmware;
pub mod info;
pub mod post;
pub mod power;
pub mod read;
pub mod route;
pub mod version;
pub mod waveplan;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show version information.
    Version(VersionArgs),
    /// List the registers the driver knows.
    Catalog,
    /// Print the read request for a register without opening a device.
    Encode(EncodeArgs),
    /// Read any register by name.
    Read(ReadArgs),
    /// Print module identity and capabilities.
    Info,
    /// Show the power-on self-test result.
    Post,
    /// Show active alarms and the case temperature.
    Alarms,
    /// Show the boot mode, or set it.
    BootMode(BootModeArgs),
    /// Show or define waveplans.
    #[command(subcommand)]
    Waveplan(WaveplanCommand),
    /// Switch channels to ports, all in one write.
    Route(RouteArgs),
    /// Show port, attenuation and measured power of channels.
    Power(PowerArgs),
    /// Read a firmware bank version or trigger a bank action.
    Firmware(FirmwareArgs),
}

/// Settings shared by every command that talks to a module.
#[derive(Debug)]
pub struct Context {
    pub device: Option<PathBuf>,
    pub baud: u32,
    pub timeout: String,
    pub format: OutputFormat,
}

pub type Device = Box<dyn Transport + Send>;

impl Context {
    /// Open the configured device as a driver port.
    pub fn open_port(&self) -> CliResult<Port<Device>> {
        let path = self
            .device
            .as_deref()
            .ok_or_else(|| CliError::usage("no device given; pass --device or set WSS_DEVICE"))?;
        let timeout = parse_duration(&self.timeout)?;

        let device = open_device(path, self.baud, timeout)?;
        debug!(device = %path.display(), baud = self.baud, ?timeout, "device opened");

        let config = PortConfig {
            read_timeout: Some(timeout),
            ..PortConfig::default()
        };
        Port::with_config(device, config).map_err(|err| transaction_error("open failed", err))
    }
}

#[cfg(unix)]
fn open_device(path: &Path, baud: u32, timeout: Duration) -> CliResult<Device> {
    use wss_transport::{LineSettings, SerialDevice};

    let settings = LineSettings {
        baud,
        read_timeout: Some(timeout),
        ..LineSettings::default()
    };
    let device = SerialDevice::open(path, settings)
        .map_err(|err| crate::exit::transport_error("open failed", err))?;
    Ok(Box::new(device))
}

#[cfg(not(unix))]
fn open_device(path: &Path, _baud: u32, _timeout: Duration) -> CliResult<Device> {
    Err(CliError::new(
        crate::exit::TRANSPORT_ERROR,
        format!(
            "open failed: serial devices are not supported on this platform ({})",
            path.display()
        ),
    ))
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Version(args) => version::run(args),
        Command::Catalog => catalog::run(ctx.format),
        Command::Encode(args) => encode::run(args, ctx.format),
        Command::Read(args) => read::run(args, ctx),
        Command::Info => info::run(ctx),
        Command::Post => post::run(ctx),
        Command::Alarms => alarms::run(ctx),
        Command::BootMode(args) => boot_mode::run(args, ctx),
        Command::Waveplan(command) => waveplan::run(command, ctx),
        Command::Route(args) => route::run(args, ctx),
        Command::Power(args) => power::run(args, ctx),
        Command::Firmware(args) => firmware::run(args, ctx),
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Register name (see `wssctl catalog`).
    pub register: String,
    /// Channel, waveplan or bank of indexed registers.
    #[arg(long, short = 'i')]
    pub instance: Option<u8>,
    /// Message id to place in the frame.
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..))]
    pub message_id: u8,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Register name (see `wssctl catalog`).
    pub register: String,
    /// Channel, waveplan or bank of indexed registers.
    #[arg(long, short = 'i')]
    pub instance: Option<u8>,
}

#[derive(Args, Debug)]
pub struct BootModeArgs {
    /// New boot mode: none, cold, warm, watchdog or hot.
    #[arg(value_parser = parse_boot_mode)]
    pub mode: Option<BootMode>,
}

#[derive(Subcommand, Debug)]
pub enum WaveplanCommand {
    /// Read a waveplan definition.
    Get {
        #[arg(long, default_value = "1")]
        plan: u8,
    },
    /// Define a waveplan in one array write.
    Set(WaveplanSetArgs),
    /// Read the center and bandwidth of a channel.
    Channel {
        channel: u8,
    },
}

#[derive(Args, Debug)]
pub struct WaveplanSetArgs {
    #[arg(long, default_value = "1")]
    pub plan: u8,
    /// Number of channels.
    #[arg(long)]
    pub channels: u16,
    /// Center frequency of the first channel, in GHz.
    #[arg(long)]
    pub start: f64,
    /// Distance between channel centers, in GHz.
    #[arg(long)]
    pub spacing: f64,
    /// Passband of each channel, in GHz.
    #[arg(long)]
    pub bandwidth: f64,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Routes as CHANNEL:PORT:ATTENUATION_DB, e.g. 3:1:2.5.
    #[arg(required = true, value_name = "CH:PORT:ATTEN")]
    pub routes: Vec<ChannelRoute>,
}

#[derive(Args, Debug)]
pub struct PowerArgs {
    /// Channels to report.
    #[arg(required = true)]
    pub channels: Vec<u8>,
}

#[derive(Args, Debug)]
pub struct FirmwareArgs {
    /// Firmware bank.
    pub bank: u8,
    /// version, start-download, commit, activate or abort.
    #[arg(value_parser = parse_firmware_op)]
    pub op: FirmwareOp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirmwareOp {
    Version,
    Action(FirmwareAction),
}

fn parse_boot_mode(input: &str) -> Result<BootMode, String> {
    BootMode::from_name(input).ok_or_else(|| {
        format!("unknown boot mode {input:?} (expected none, cold, warm, watchdog or hot)")
    })
}

fn parse_firmware_op(input: &str) -> Result<FirmwareOp, String> {
    if input.eq_ignore_ascii_case("version") {
        return Ok(FirmwareOp::Version);
    }
    FirmwareAction::from_name(input)
        .map(FirmwareOp::Action)
        .ok_or_else(|| format!("unknown firmware operation {input:?}"))
}

/// Parse `500ms`, `2s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("timeout must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid timeout value: {input}")))?;
    if value == 0 {
        return Err(CliError::usage("timeout must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
