use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// A command result: a serializable body plus its field/value rows for
/// human-readable formats. `raw` is what `--format raw` writes.
pub struct Report<'a, T: Serialize> {
    pub body: &'a T,
    pub rows: Vec<(&'static str, String)>,
    pub raw: Vec<u8>,
}

pub fn print_report<T: Serialize>(report: &Report<'_, T>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report.body),
        OutputFormat::Table => {
            let rows = report
                .rows
                .iter()
                .map(|(field, value)| vec![field.to_string(), value.clone()])
                .collect();
            print_table(&["FIELD", "VALUE"], rows);
        }
        OutputFormat::Pretty => {
            let width = report.rows.iter().map(|(f, _)| f.len()).max().unwrap_or(0);
            for (field, value) in &report.rows {
                println!("{:<width$}  {value}", format!("{field}:"), width = width + 1);
            }
        }
        OutputFormat::Raw => print_raw(&report.raw),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_table(header: &[&str], rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Space-separated uppercase hex, e.g. `DD 01 01`.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_dump_is_spaced_uppercase() {
        assert_eq!(hex(&[0xDD, 0x01, 0x0a]), "DD 01 0A");
        assert_eq!(hex(&[]), "");
    }
}
