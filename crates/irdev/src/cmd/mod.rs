use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use irdev_driver::DEFAULT_DEVICE;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod doctor;
pub mod info;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a device and print its negotiated capabilities.
    Info(InfoArgs),
    /// Transmit a raw pulse train.
    Send(SendArgs),
    /// Receive and print signals.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Info(args) => info::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Doctor(args) => doctor::run(args, format),
    }
}

#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Device path: LIRC character device, FIFO, or unix socket.
    #[arg(long, short = 'd', env = "IRDEV_DEVICE", default_value = DEFAULT_DEVICE)]
    pub device: PathBuf,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Pulse/space durations in microseconds (e.g. 900,450,900).
    #[arg(long, conflicts_with = "file")]
    pub pulses: Option<String>,
    /// Read durations from a file (mode2 text or plain numbers).
    #[arg(long, conflicts_with = "pulses")]
    pub file: Option<PathBuf>,
    /// Carrier frequency in Hz. 0 uses the driver default.
    #[arg(long)]
    pub carrier: Option<u32>,
    /// Duty cycle in percent. 0 uses the driver default.
    #[arg(long)]
    pub duty_cycle: Option<u32>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// How long to wait for each signal to start (e.g. 5s, 500ms, or "none").
    #[arg(long, default_value = "500ms")]
    pub timeout: String,
    /// Silence that ends a signal (e.g. 100ms).
    #[arg(long, default_value = "100ms")]
    pub gap: String,
    /// Exit after receiving N signals.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {
    /// Device to check in addition to the /dev/lirc* scan.
    #[arg(long, short = 'd', env = "IRDEV_DEVICE")]
    pub device: Option<PathBuf>,
}

/// Parse `500ms`, `5s` or a bare number of seconds.
pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration(" 2 ").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn rejects_bad_durations() {
        assert_eq!(parse_duration("").unwrap_err().code, USAGE);
        assert_eq!(parse_duration("0ms").unwrap_err().code, USAGE);
        assert_eq!(parse_duration("fast").unwrap_err().code, USAGE);
    }
}
