use serde::Serialize;
use wss_driver::{catalog, TransactionError};
use wss_frame::{encode_command, CommandCode};

use crate::cmd::EncodeArgs;
use crate::exit::{transaction_error, CliResult, SUCCESS};
use crate::output::{hex, print_report, OutputFormat, Report};

#[derive(Serialize)]
struct EncodeOutput {
    register: &'static str,
    address: String,
    message_id: u8,
    command: &'static str,
    length: usize,
    frame: String,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let register = catalog::require(&args.register)
        .and_then(|register| {
            if register.access.readable() {
                Ok(register)
            } else {
                Err(TransactionError::NotReadable(register.name))
            }
        })
        .map_err(|err| transaction_error("encode failed", err))?;

    let field = register.read_field(args.instance);
    let wire = encode_command(args.message_id, CommandCode::Read, &[field.clone()])
        .map_err(|err| transaction_error("encode failed", TransactionError::Encode(err)))?;

    let out = EncodeOutput {
        register: register.name,
        address: field.address.to_string(),
        message_id: args.message_id,
        command: CommandCode::Read.name(),
        length: wire.len(),
        frame: hex(&wire),
    };
    let rows = vec![
        ("register", out.register.to_string()),
        ("address", out.address.clone()),
        ("message id", format!("0x{:02X}", out.message_id)),
        ("command", out.command.to_string()),
        ("length", out.length.to_string()),
        ("frame", out.frame.clone()),
    ];
    print_report(
        &Report {
            body: &out,
            rows,
            raw: wire.to_vec(),
        },
        format,
    );
    Ok(SUCCESS)
}
