use crate::cmd::Context;
use crate::exit::{transaction_error, CliResult, SUCCESS};
use crate::output::{print_report, Report};

pub fn run(ctx: &Context) -> CliResult<i32> {
    let port = ctx.open_port()?;
    let info = port
        .module_info()
        .map_err(|err| transaction_error("info failed", err))?;

    let rows = vec![
        ("vendor", info.vendor.clone()),
        ("part number", info.part_number.clone()),
        ("serial number", info.serial_number.clone()),
        ("firmware", info.firmware_version.clone()),
        ("hardware", info.hardware_version.clone()),
        (
            "frequency range",
            format!(
                "{:.3} - {:.3} GHz",
                info.min_frequency_ghz, info.max_frequency_ghz
            ),
        ),
        (
            "min channel bandwidth",
            format!("{:.3} GHz", info.min_channel_bandwidth_ghz),
        ),
        ("max wss id", info.max_wss_id.to_string()),
        ("max ocm id", info.max_ocm_id.to_string()),
        ("max waveplan id", info.max_waveplan_id.to_string()),
    ];
    let raw = format!("{}\n", info.serial_number).into_bytes();
    print_report(
        &Report {
            body: &info,
            rows,
            raw,
        },
        ctx.format,
    );
    Ok(SUCCESS)
}
