use serde::Serialize;

use crate::cmd::{Context, PowerArgs};
use crate::exit::{transaction_error, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct ChannelStatus {
    channel: u8,
    port: u16,
    attenuation_db: f64,
    power_dbm: f64,
}

pub fn run(args: PowerArgs, ctx: &Context) -> CliResult<i32> {
    let port = ctx.open_port()?;

    let mut statuses = Vec::with_capacity(args.channels.len());
    for channel in args.channels {
        let context = format!("channel {channel} read failed");
        statuses.push(ChannelStatus {
            channel,
            port: port
                .channel_port(channel)
                .map_err(|err| transaction_error(&context, err))?,
            attenuation_db: port
                .channel_attenuation(channel)
                .map_err(|err| transaction_error(&context, err))?,
            power_dbm: port
                .channel_power(channel)
                .map_err(|err| transaction_error(&context, err))?,
        });
    }

    match ctx.format {
        OutputFormat::Json => print_json(&statuses),
        OutputFormat::Table => print_table(
            &["CHANNEL", "PORT", "ATTENUATION (dB)", "POWER (dBm)"],
            statuses
                .iter()
                .map(|s| {
                    vec![
                        s.channel.to_string(),
                        s.port.to_string(),
                        format!("{:.2}", s.attenuation_db),
                        format!("{:.2}", s.power_dbm),
                    ]
                })
                .collect(),
        ),
        OutputFormat::Pretty | OutputFormat::Raw => {
            for s in &statuses {
                println!(
                    "channel {}: port {} attenuation {:.2} dB power {:.2} dBm",
                    s.channel, s.port, s.attenuation_db, s.power_dbm
                );
            }
        }
    }
    Ok(SUCCESS)
}
