use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use irdev_driver::{Capture, CodeCapture, Driver, ReceiveMode};

use crate::cmd::{parse_duration, ListenArgs};
use crate::exit::{driver_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::output::{print_code, print_signal, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = if args.timeout.trim().eq_ignore_ascii_case("none") {
        None
    } else {
        Some(parse_duration(&args.timeout)?)
    };
    let gap = parse_duration(&args.gap)?;

    let mut driver = Driver::with_device(&args.device.device);
    driver
        .init()
        .map_err(|err| driver_error("init failed", err))?;
    let Some(mode) = driver.receive_mode() else {
        driver.deinit();
        return Err(CliError::new(
            USAGE,
            format!("{} cannot receive", args.device.device.display()),
        ));
    };

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let device = args.device.device.display().to_string();
    let code_length = driver.code_length();
    let mut capture = Capture::new(wait, gap);
    let mut codes = CodeCapture::new(wait);
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let received = match mode {
            ReceiveMode::Mode2 => driver
                .receive(&mut capture)
                .map(|samples| print_signal(&device, &samples, format))
                .is_some(),
            ReceiveMode::LircCode => driver
                .receive(&mut codes)
                .map(|code| print_code(&device, code, code_length, format))
                .is_some(),
        };

        if received {
            printed = printed.saturating_add(1);
            if let Some(count) = args.count {
                if printed >= count {
                    break;
                }
            }
        }

        if !driver.is_open() {
            tracing::error!(path = %device, "device closed");
            return Ok(FAILURE);
        }
    }

    if driver.invalid_samples() > 0 {
        tracing::warn!(count = driver.invalid_samples(), "zero-length samples were corrected");
    }
    driver.deinit();
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
