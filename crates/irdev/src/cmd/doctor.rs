use std::fs;
use std::path::{Path, PathBuf};

use irdev_driver::{Driver, DEFAULT_DEVICE};
use serde::Serialize;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    schema_id: &'static str,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let devices = scan_lirc_devices(Path::new("/dev"));
    let mut checks = vec![platform_check(), lirc_devices_check(&devices)];

    match &args.device {
        Some(device) => checks.push(device_check(device)),
        None => {
            for device in &devices {
                checks.push(device_check(device));
            }
        }
    }
    checks.push(compiled_features_check());

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput {
        schema_id: "https://schemas.3leaps.dev/irdev/cli/v1/doctor-report.schema.json",
        checks,
        overall,
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("irdev doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<22} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
    }
}

fn platform_check() -> CheckResult {
    let (status, detail) = if cfg!(target_os = "linux") {
        (CheckStatus::Pass, "Linux LIRC character devices supported")
    } else {
        (
            CheckStatus::Warn,
            "no LIRC kernel interface; only FIFO and socket endpoints work",
        )
    };
    CheckResult {
        name: "platform".to_string(),
        status,
        detail: detail.to_string(),
    }
}

fn scan_lirc_devices(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut devices: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("lirc"))
        .map(|entry| entry.path())
        .collect();
    devices.sort();
    devices
}

fn lirc_devices_check(devices: &[PathBuf]) -> CheckResult {
    if devices.is_empty() {
        return CheckResult {
            name: "lirc_devices".to_string(),
            status: CheckStatus::Warn,
            detail: format!("no /dev/lirc* devices found (default is {DEFAULT_DEVICE})"),
        };
    }
    let names: Vec<String> = devices.iter().map(|d| d.display().to_string()).collect();
    CheckResult {
        name: "lirc_devices".to_string(),
        status: CheckStatus::Pass,
        detail: names.join(", "),
    }
}

fn device_check(device: &Path) -> CheckResult {
    let name = format!("device {}", device.display());
    let mut driver = Driver::with_device(device);
    match driver.init() {
        Ok(()) => {
            let send = driver.send_mode().map(|m| m.name()).unwrap_or("none");
            let receive = driver.receive_mode().map(|m| m.name()).unwrap_or("none");
            driver.deinit();
            CheckResult {
                name,
                status: CheckStatus::Pass,
                detail: format!("send={send} receive={receive}"),
            }
        }
        Err(err) => CheckResult {
            name,
            status: CheckStatus::Fail,
            detail: err.to_string(),
        },
    }
}

fn compiled_features_check() -> CheckResult {
    CheckResult {
        name: "compiled_features".to_string(),
        status: CheckStatus::Info,
        detail: format!(
            "cli=true target={}",
            option_env!("IRDEV_BUILD_TARGET").unwrap_or("unknown")
        ),
    }
}
