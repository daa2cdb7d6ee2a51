use std::fs;

use irdev_driver::{Driver, RawEncoder, RawSignal, Sample, SendBuffer, SendOutcome};
use serde::Serialize;

use crate::cmd::SendArgs;
use crate::exit::{driver_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct SendOutput {
    schema_id: &'static str,
    device: String,
    sent: bool,
    samples: usize,
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let text = resolve_pulses(&args)?;
    let durations = parse_pulses(&text)?;

    let signal = RawSignal {
        durations,
        carrier: args.carrier,
        duty_cycle: args.duty_cycle,
    };

    let mut driver = Driver::with_device(&args.device.device);
    driver
        .init()
        .map_err(|err| driver_error("init failed", err))?;

    let mut buffer = SendBuffer::new();
    let result = driver.send(&mut RawEncoder, &signal, &mut buffer);
    driver.deinit();
    let outcome = result.map_err(|err| driver_error("send failed", err))?;

    let samples = match outcome {
        SendOutcome::Empty => 0,
        SendOutcome::Sent { samples } => samples,
    };
    tracing::info!(samples, "signal sent");

    let out = SendOutput {
        schema_id: "https://schemas.3leaps.dev/irdev/cli/v1/signal-sent.schema.json",
        device: args.device.device.display().to_string(),
        sent: samples > 0,
        samples,
    };
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("sent {} samples to {}", out.samples, out.device);
        }
        OutputFormat::Raw => println!("{}", out.samples),
    }

    Ok(SUCCESS)
}

fn resolve_pulses(args: &SendArgs) -> CliResult<String> {
    if let Some(pulses) = &args.pulses {
        return Ok(pulses.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "one of --pulses or --file is required"))
}

/// Parse durations separated by commas or whitespace.
///
/// Accepts `mode2`-style text: `pulse`/`space` words are skipped, a leading
/// `+`/`-` is dropped, and `#` starts a comment.
fn parse_pulses(text: &str) -> CliResult<Vec<Sample>> {
    let mut durations = Vec::new();
    for line in text.lines() {
        let line = line.split('#').next().unwrap_or_default();
        for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
            let token = token.trim();
            if token.is_empty() || token == "pulse" || token == "space" {
                continue;
            }
            let digits = token.trim_start_matches(['+', '-']);
            let value: Sample = digits
                .parse()
                .map_err(|_| CliError::new(USAGE, format!("invalid duration: {token}")))?;
            durations.push(value);
        }
    }
    Ok(durations)
}
