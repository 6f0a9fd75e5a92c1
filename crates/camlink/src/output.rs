use std::io::IsTerminal;

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

/// One wire frame, encoded or decoded, ready for display.
#[derive(Debug, Serialize)]
pub struct FrameReport {
    /// "request" or "response".
    pub direction: &'static str,
    /// Framing rule the frame follows ("v1" or "legacy").
    pub protocol: &'static str,
    /// Command opcode, when the frame carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_name: Option<&'static str>,
    pub length: usize,
    /// "valid" or "invalid".
    pub checksum: &'static str,
    /// Frame bytes as lowercase hex.
    pub bytes: String,
}

pub fn print_report(report: &FrameReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DIRECTION", "PROTOCOL", "COMMAND", "LEN", "CRC", "BYTES"])
                .add_row(vec![
                    report.direction.to_string(),
                    report.protocol.to_string(),
                    report
                        .command_name
                        .map(str::to_string)
                        .unwrap_or_else(|| "-".to_string()),
                    report.length.to_string(),
                    report.checksum.to_string(),
                    report.bytes.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "direction={} protocol={} command={} len={} crc={} bytes={}",
                report.direction,
                report.protocol,
                report.command_name.unwrap_or("-"),
                report.length,
                report.checksum,
                report.bytes
            );
        }
        OutputFormat::Raw => {
            println!("{}", report.bytes);
        }
    }
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
