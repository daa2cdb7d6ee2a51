use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use irdev_driver::{Driver, API_VERSION, DRIVER_NAME, DRIVER_VERSION};
use irdev_transport::EndpointKind;
use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{driver_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct DeviceNumbers {
    major: u32,
    minor: u32,
}

#[derive(Serialize)]
struct DriverIdentity {
    name: &'static str,
    version: &'static str,
    api_version: u32,
}

#[derive(Serialize)]
struct InfoOutput {
    schema_id: &'static str,
    device: String,
    kind: &'static str,
    device_numbers: Option<DeviceNumbers>,
    features: String,
    feature_names: Vec<&'static str>,
    send_mode: Option<&'static str>,
    receive_mode: Option<&'static str>,
    resolution: u32,
    code_length: u32,
    driver: DriverIdentity,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let mut driver = Driver::with_device(&args.device.device);
    driver
        .init()
        .map_err(|err| driver_error("init failed", err))?;

    let kind = driver.kind();
    let device_numbers = match kind {
        Some(EndpointKind::CharDevice { major, minor }) => Some(DeviceNumbers { major, minor }),
        _ => None,
    };

    let out = InfoOutput {
        schema_id: "https://schemas.3leaps.dev/irdev/cli/v1/device-info.schema.json",
        device: args.device.device.display().to_string(),
        kind: kind.map(|k| k.name()).unwrap_or("unknown"),
        device_numbers,
        features: format!("{:#010x}", driver.features().bits()),
        feature_names: driver.features().names(),
        send_mode: driver.send_mode().map(|m| m.name()),
        receive_mode: driver.receive_mode().map(|m| m.name()),
        resolution: driver.resolution(),
        code_length: driver.code_length(),
        driver: DriverIdentity {
            name: DRIVER_NAME,
            version: DRIVER_VERSION,
            api_version: API_VERSION,
        },
    };
    driver.deinit();

    print_info(&out, format);
    Ok(SUCCESS)
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in info_rows(out) {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("irdev device info\n");
            for (field, value) in info_rows(out) {
                println!("  {:<14} {}", format!("{field}:"), value);
            }
        }
        OutputFormat::Raw => {
            println!("{}", out.features);
        }
    }
}

fn info_rows(out: &InfoOutput) -> Vec<(&'static str, String)> {
    let numbers = out
        .device_numbers
        .as_ref()
        .map(|n| format!("{}:{}", n.major, n.minor))
        .unwrap_or_else(|| "-".to_string());
    vec![
        ("Device", out.device.clone()),
        ("Kind", out.kind.to_string()),
        ("Numbers", numbers),
        ("Features", format!("{} {}", out.features, out.feature_names.join(","))),
        ("Send mode", out.send_mode.unwrap_or("none").to_string()),
        ("Receive mode", out.receive_mode.unwrap_or("none").to_string()),
        ("Resolution", format!("{} us", out.resolution)),
        ("Code length", out.code_length.to_string()),
        (
            "Driver",
            format!(
                "{} {} (api {})",
                out.driver.name, out.driver.version, out.driver.api_version
            ),
        ),
    ]
}
