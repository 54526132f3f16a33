use crate::cmd::{Context, RouteArgs};
use crate::exit::{transaction_error, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

pub fn run(args: RouteArgs, ctx: &Context) -> CliResult<i32> {
    let port = ctx.open_port()?;
    port.set_channel_routes(&args.routes)
        .map_err(|err| transaction_error("route write failed", err))?;

    match ctx.format {
        OutputFormat::Json => print_json(&args.routes),
        OutputFormat::Table => print_table(
            &["CHANNEL", "PORT", "ATTENUATION (dB)"],
            args.routes
                .iter()
                .map(|r| {
                    vec![
                        r.channel.to_string(),
                        r.port.to_string(),
                        format!("{:.2}", r.attenuation_db),
                    ]
                })
                .collect(),
        ),
        OutputFormat::Pretty | OutputFormat::Raw => {
            for r in &args.routes {
                println!(
                    "channel {} -> port {} ({:.2} dB)",
                    r.channel, r.port, r.attenuation_db
                );
            }
        }
    }
    Ok(SUCCESS)
}
