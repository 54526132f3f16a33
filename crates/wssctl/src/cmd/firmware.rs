use serde::Serialize;
use wss_driver::FirmwareAction;

use crate::cmd::{Context, FirmwareArgs, FirmwareOp};
use crate::exit::{transaction_error, CliResult, SUCCESS};
use crate::output::{print_report, Report};

#[derive(Serialize)]
struct VersionOutput {
    bank: u8,
    version: String,
}

#[derive(Serialize)]
struct ActionOutput {
    bank: u8,
    action: FirmwareAction,
    accepted: bool,
}

pub fn run(args: FirmwareArgs, ctx: &Context) -> CliResult<i32> {
    let port = ctx.open_port()?;
    let bank = args.bank;

    match args.op {
        FirmwareOp::Version => {
            let version = port.firmware_bank_version(bank).map_err(|err| {
                transaction_error(&format!("bank {bank} version read failed"), err)
            })?;
            let rows = vec![("bank", bank.to_string()), ("version", version.clone())];
            let raw = format!("{version}\n").into_bytes();
            print_report(
                &Report {
                    body: &VersionOutput { bank, version },
                    rows,
                    raw,
                },
                ctx.format,
            );
        }
        FirmwareOp::Action(action) => {
            port.firmware_command(bank, action)
                .map_err(|err| transaction_error(&format!("bank {bank} {action} failed"), err))?;
            let rows = vec![
                ("bank", bank.to_string()),
                ("action", action.to_string()),
                ("accepted", "true".to_string()),
            ];
            print_report(
                &Report {
                    body: &ActionOutput {
                        bank,
                        action,
                        accepted: true,
                    },
                    rows,
                    raw: Vec::new(),
                },
                ctx.format,
            );
        }
    }
    Ok(SUCCESS)
}
