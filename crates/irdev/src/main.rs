mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "irdev", version, about = "LIRC infrared device CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "irdev",
            "send",
            "--device",
            "/dev/lirc1",
            "--pulses",
            "900,450,900",
            "--carrier",
            "36000",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.device.device.to_str(), Some("/dev/lirc1"));
                assert_eq!(args.carrier, Some(36_000));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_pulse_sources() {
        let err = Cli::try_parse_from([
            "irdev",
            "send",
            "--pulses",
            "900",
            "--file",
            "/tmp/signal.txt",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_listen_subcommand() {
        let cli = Cli::try_parse_from(["irdev", "listen", "--timeout", "2s", "--count", "3"])
            .expect("listen args should parse");
        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.timeout, "2s");
                assert_eq!(args.count, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_format_flag_follows_subcommand() {
        let cli = Cli::try_parse_from(["irdev", "info", "--format", "json"])
            .expect("info args should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.command, Command::Info(_)));
    }
}
