use serde::Serialize;
use wss_driver::{catalog, Value};

use crate::cmd::{Context, ReadArgs};
use crate::exit::{transaction_error, CliResult, SUCCESS};
use crate::output::{hex, print_report, Report};

#[derive(Serialize)]
struct ReadOutput<'a> {
    register: &'static str,
    address: String,
    value: &'a Value,
    display: String,
    request: String,
    response: String,
}

pub fn run(args: ReadArgs, ctx: &Context) -> CliResult<i32> {
    let register =
        catalog::require(&args.register).map_err(|err| transaction_error("read failed", err))?;
    let port = ctx.open_port()?;
    let exchange = port
        .read_exchange(register, args.instance)
        .map_err(|err| transaction_error(&format!("read {} failed", register.name), err))?;

    let out = ReadOutput {
        register: register.name,
        address: register.address_at(args.instance).to_string(),
        value: &exchange.value,
        display: exchange.value.to_string(),
        request: hex(&exchange.request),
        response: hex(&exchange.response),
    };
    let rows = vec![
        ("register", out.register.to_string()),
        ("address", out.address.clone()),
        ("value", out.display.clone()),
        ("request", out.request.clone()),
        ("response", out.response.clone()),
    ];
    print_report(
        &Report {
            body: &out,
            rows,
            raw: exchange.frame.payload.to_vec(),
        },
        ctx.format,
    );
    Ok(SUCCESS)
}
