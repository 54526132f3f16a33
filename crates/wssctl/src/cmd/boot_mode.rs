use serde::Serialize;
use wss_driver::BootMode;

use crate::cmd::{BootModeArgs, Context};
use crate::exit::{transaction_error, CliResult, SUCCESS};
use crate::output::{print_report, Report};

#[derive(Serialize)]
struct BootModeOutput {
    mode: BootMode,
    raw: u16,
    changed: bool,
}

pub fn run(args: BootModeArgs, ctx: &Context) -> CliResult<i32> {
    let port = ctx.open_port()?;

    let (mode, changed) = match args.mode {
        Some(mode) => {
            port.set_boot_mode(mode)
                .map_err(|err| transaction_error("boot mode write failed", err))?;
            (mode, true)
        }
        None => {
            let mode = port
                .boot_mode()
                .map_err(|err| transaction_error("boot mode read failed", err))?;
            (mode, false)
        }
    };

    let out = BootModeOutput {
        mode,
        raw: mode.as_raw(),
        changed,
    };
    let rows = vec![
        ("boot mode", mode.to_string()),
        ("raw", out.raw.to_string()),
        ("changed", changed.to_string()),
    ];
    print_report(
        &Report {
            body: &out,
            rows,
            raw: format!("{mode}\n").into_bytes(),
        },
        ctx.format,
    );
    Ok(SUCCESS)
}
