use irdev_driver::{API_VERSION, DRIVER_NAME, DRIVER_VERSION};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("irdev {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: irdev");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("driver: {DRIVER_NAME} {DRIVER_VERSION}");
    println!("driver_api: {API_VERSION}");
    println!(
        "target: {}",
        option_env!("IRDEV_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("IRDEV_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("features: cli=true");

    Ok(SUCCESS)
}
