use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use irdev_driver::{Code, Mode2Sample, Sample};
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

#[derive(Serialize)]
struct SignalOutput<'a> {
    schema_id: &'a str,
    device: &'a str,
    receive_mode: &'a str,
    samples: &'a [Sample],
    decoded: Vec<String>,
    timestamp: String,
}

#[derive(Serialize)]
struct CodeOutput<'a> {
    schema_id: &'a str,
    device: &'a str,
    receive_mode: &'a str,
    code: Code,
    code_hex: String,
    code_length: u32,
    timestamp: String,
}

/// Print one captured mode2 signal.
pub fn print_signal(device: &str, samples: &[Sample], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SignalOutput {
                schema_id: "https://schemas.3leaps.dev/irdev/cli/v1/signal-received.schema.json",
                device,
                receive_mode: "mode2",
                samples,
                decoded: samples.iter().map(|s| describe_sample(*s)).collect(),
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
                .set_header(vec!["#", "RAW", "SAMPLE"]);
            for (index, sample) in samples.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    format!("{sample:#010x}"),
                    describe_sample(*sample),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for sample in samples {
                println!("{}", describe_sample(*sample));
            }
        }
        OutputFormat::Raw => {
            let line = samples
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            println!("{line}");
        }
    }
}

/// Print one lirccode code word.
pub fn print_code(device: &str, code: Code, code_length: u32, format: OutputFormat) {
    let code_hex = format_code(code, code_length);
    match format {
        OutputFormat::Json => {
            let out = CodeOutput {
                schema_id: "https://schemas.3leaps.dev/irdev/cli/v1/code-received.schema.json",
                device,
                receive_mode: "lirccode",
                code,
                code_hex,
                code_length,
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
                .set_header(vec!["CODE", "BITS"]);
            table.add_row(vec![code_hex, code_length.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("code {code_hex}"),
        OutputFormat::Raw => println!("{code}"),
    }
}

/// Human-readable form of a mode2 sample.
pub fn describe_sample(sample: Sample) -> String {
    Mode2Sample::from(sample).to_string()
}

/// Hex with one digit per started nibble of the code length.
fn format_code(code: Code, code_length: u32) -> String {
    let digits = code_length.div_ceil(4).max(1) as usize;
    format!("{code:#0width$x}", width = digits + 2)
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_mode2_samples() {
        assert_eq!(describe_sample(0x0100_0384), "pulse 900");
        assert_eq!(describe_sample(450), "space 450");
    }

    #[test]
    fn code_hex_is_padded_to_code_length() {
        assert_eq!(format_code(0x1_0000_0000, 64), "0x0000000100000000");
        assert_eq!(format_code(0xabc, 12), "0xabc");
        assert_eq!(format_code(0x5, 13), "0x0005");
        assert_eq!(format_code(0, 0), "0x0");
    }
}
