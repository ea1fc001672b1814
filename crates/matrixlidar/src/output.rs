use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
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

/// One command result: a typed body for JSON plus ordered display fields.
pub struct Reading<'a, T: Serialize> {
    pub kind: &'static str,
    pub address: String,
    pub body: &'a T,
    pub fields: Vec<(&'static str, String)>,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    kind: &'static str,
    address: &'a str,
    #[serde(flatten)]
    body: &'a T,
    timestamp: String,
}

pub fn print_reading<T: Serialize>(reading: &Reading<'_, T>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = Envelope {
                kind: reading.kind,
                address: &reading.address,
                body: reading.body,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            table.add_row(vec!["address".to_string(), reading.address.clone()]);
            for (name, value) in &reading.fields {
                table.add_row(vec![name.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let fields = reading
                .fields
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{} address={} {fields}", reading.kind, reading.address);
        }
        OutputFormat::Raw => {
            let values = reading
                .fields
                .iter()
                .map(|(_, value)| value.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            println!("{values}");
        }
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
