use serde::Serialize;
use wss_driver::PostFlags;

use crate::cmd::Context;
use crate::exit::{transaction_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_report, Report};

#[derive(Serialize)]
struct PostOutput {
    raw: PostFlags,
    passed: bool,
    failures: Vec<&'static str>,
    safe_mode_hold: bool,
}

/// Exits with `FAILURE` when any self-test failed.
pub fn run(ctx: &Context) -> CliResult<i32> {
    let port = ctx.open_port()?;
    let flags = port
        .post_result()
        .map_err(|err| transaction_error("post failed", err))?;

    let out = PostOutput {
        raw: flags,
        passed: flags.passed(),
        failures: flags.failures(),
        safe_mode_hold: flags.safe_mode_hold(),
    };
    let failures = if out.failures.is_empty() {
        "none".to_string()
    } else {
        out.failures.join(", ")
    };
    let rows = vec![
        ("raw", format!("0x{:04X}", flags.0)),
        ("passed", out.passed.to_string()),
        ("failed tests", failures),
        ("safe mode hold", out.safe_mode_hold.to_string()),
    ];
    print_report(
        &Report {
            body: &out,
            rows,
            raw: flags.0.to_le_bytes().to_vec(),
        },
        ctx.format,
    );

    Ok(if out.passed { SUCCESS } else { FAILURE })
}
