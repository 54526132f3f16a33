mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use wss_transport::DEFAULT_BAUD;

use crate::cmd::{Command, Context};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "wssctl", version, about = "Control wavelength-selective switch modules")]
struct Cli {
    /// Serial device the module is attached to.
    #[arg(long, value_name = "PATH", env = "WSS_DEVICE", global = true)]
    device: Option<PathBuf>,

    /// Line speed.
    #[arg(long, value_name = "BAUD", env = "WSS_BAUD", default_value_t = DEFAULT_BAUD, global = true)]
    baud: u32,

    /// Reply timeout (e.g. 1s, 500ms).
    #[arg(long, value_name = "DURATION", env = "WSS_TIMEOUT", default_value = "1s", global = true)]
    timeout: String,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let ctx = Context {
        device: cli.device,
        baud: cli.baud,
        timeout: cli.timeout,
        format: cli.format.unwrap_or_else(OutputFormat::default_for_stdout),
    };

    match cmd::run(cli.command, &ctx) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
