use serde::Serialize;
use wss_driver::catalog::{Register, ALL};
use wss_driver::{Access, Instance};

use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct Entry {
    name: &'static str,
    address: String,
    instance: String,
    shape: &'static str,
    reply_bytes: String,
    access: Access,
    description: &'static str,
}

impl From<&Register> for Entry {
    fn from(register: &Register) -> Self {
        let instance = match register.instance {
            Instance::Fixed(n) => n.to_string(),
            Instance::Indexed(label) => format!("<{label}>"),
        };
        let reply_bytes = match register.response.len {
            Some(len) => len.to_string(),
            None => format!(">={}", register.response.shape.width()),
        };
        Self {
            name: register.name,
            address: register.address.to_string(),
            instance,
            shape: register.response.shape.kind(),
            reply_bytes,
            access: register.access,
            description: register.description,
        }
    }
}

pub fn run(format: OutputFormat) -> CliResult<i32> {
    let entries: Vec<Entry> = ALL.iter().map(|register| Entry::from(*register)).collect();

    match format {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Table => print_table(
            &["NAME", "ADDRESS", "INSTANCE", "SHAPE", "BYTES", "ACCESS", "DESCRIPTION"],
            entries
                .iter()
                .map(|e| {
                    vec![
                        e.name.to_string(),
                        e.address.clone(),
                        e.instance.clone(),
                        e.shape.to_string(),
                        e.reply_bytes.clone(),
                        e.access.to_string(),
                        e.description.to_string(),
                    ]
                })
                .collect(),
        ),
        OutputFormat::Pretty | OutputFormat::Raw => {
            for e in &entries {
                println!(
                    "{:<28} {} {:<4} {:<10} {}",
                    e.name, e.address, e.access, e.shape, e.description
                );
            }
        }
    }
    Ok(SUCCESS)
}
