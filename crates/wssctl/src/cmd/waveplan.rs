use wss_driver::{Waveplan, WaveplanChannel};

use crate::cmd::{Context, WaveplanCommand, WaveplanSetArgs};
use crate::exit::{transaction_error, CliResult, SUCCESS};
use crate::output::{print_report, Report};

pub fn run(command: WaveplanCommand, ctx: &Context) -> CliResult<i32> {
    let port = ctx.open_port()?;

    match command {
        WaveplanCommand::Get { plan } => {
            let waveplan = port
                .waveplan(plan)
                .map_err(|err| transaction_error(&format!("waveplan {plan} read failed"), err))?;
            print_waveplan(plan, &waveplan, ctx);
        }
        WaveplanCommand::Set(args) => {
            let waveplan = waveplan_from_args(&args);
            port.set_waveplan(args.plan, &waveplan).map_err(|err| {
                transaction_error(&format!("waveplan {} write failed", args.plan), err)
            })?;
            print_waveplan(args.plan, &waveplan, ctx);
        }
        WaveplanCommand::Channel { channel } => {
            let entry = port
                .waveplan_channel(channel)
                .map_err(|err| transaction_error(&format!("channel {channel} read failed"), err))?;
            print_channel(&entry, ctx);
        }
    }
    Ok(SUCCESS)
}

fn waveplan_from_args(args: &WaveplanSetArgs) -> Waveplan {
    Waveplan {
        channel_count: args.channels,
        start_ghz: args.start,
        spacing_ghz: args.spacing,
        bandwidth_ghz: args.bandwidth,
    }
}

fn print_waveplan(plan: u8, waveplan: &Waveplan, ctx: &Context) {
    let rows = vec![
        ("plan", plan.to_string()),
        ("channels", waveplan.channel_count.to_string()),
        ("start", format!("{:.3} GHz", waveplan.start_ghz)),
        ("spacing", format!("{:.3} GHz", waveplan.spacing_ghz)),
        ("bandwidth", format!("{:.3} GHz", waveplan.bandwidth_ghz)),
    ];
    print_report(
        &Report {
            body: waveplan,
            rows,
            raw: Vec::new(),
        },
        ctx.format,
    );
}

fn print_channel(entry: &WaveplanChannel, ctx: &Context) {
    let rows = vec![
        ("channel", entry.channel.to_string()),
        ("center", format!("{:.3} GHz", entry.center_ghz)),
        ("bandwidth", format!("{:.3} GHz", entry.bandwidth_ghz)),
    ];
    print_report(
        &Report {
            body: entry,
            rows,
            raw: Vec::new(),
        },
        ctx.format,
    );
}
