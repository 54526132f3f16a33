use serde::Serialize;
use wss_driver::AlarmFlags;

use crate::cmd::Context;
use crate::exit::{transaction_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_report, Report};

#[derive(Serialize)]
struct AlarmOutput {
    raw: AlarmFlags,
    active: Vec<&'static str>,
    case_temperature_c: f64,
}

/// Exits with `FAILURE` while any alarm is raised.
pub fn run(ctx: &Context) -> CliResult<i32> {
    let port = ctx.open_port()?;
    let flags = port
        .alarm_summary()
        .map_err(|err| transaction_error("alarm read failed", err))?;
    let temperature = port
        .case_temperature()
        .map_err(|err| transaction_error("temperature read failed", err))?;

    let out = AlarmOutput {
        raw: flags,
        active: flags.active(),
        case_temperature_c: temperature,
    };
    let active = if flags.is_clear() {
        "none".to_string()
    } else if out.active.is_empty() {
        format!("unknown (0x{:04X})", flags.0)
    } else {
        out.active.join(", ")
    };
    let rows = vec![
        ("alarms", active),
        ("case temperature", format!("{temperature:.2} °C")),
    ];
    print_report(
        &Report {
            body: &out,
            rows,
            raw: flags.0.to_le_bytes().to_vec(),
        },
        ctx.format,
    );

    Ok(if flags.is_clear() { SUCCESS } else { FAILURE })
}
