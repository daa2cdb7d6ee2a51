use std::fmt;
use std::io;

use irdev_driver::DriverError;
use irdev_transport::TransportError;

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Stat { source, .. }
        | TransportError::Open { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn driver_error(context: &str, err: DriverError) -> CliError {
    match err {
        DriverError::Transport(err) => transport_error(context, err),
        DriverError::Connect { source, .. } => io_error(context, source),
        DriverError::UnsupportedDeviceKind { .. }
        | DriverError::FeaturesUnavailable { .. }
        | DriverError::CodeLengthUnavailable(_)
        | DriverError::CodeTooWide { .. }
        | DriverError::NoUsableMode => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        DriverError::SendModeUnsupported
        | DriverError::ReceiveUnsupported
        | DriverError::ReceiveModeMismatch { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        DriverError::EncodeFailed => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        DriverError::WriteFailed(source)
        | DriverError::CarrierSetFailed { source, .. }
        | DriverError::DutyCycleSetFailed { source, .. } => io_error(context, source),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_maps_to_dedicated_code() {
        let err = io_error("open", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.code, PERMISSION_DENIED);
        assert!(err.message.starts_with("open: "));
    }

    #[test]
    fn negotiation_failures_are_transport_errors() {
        let err = driver_error("init failed", DriverError::NoUsableMode);
        assert_eq!(err.code, TRANSPORT_ERROR);

        let err = driver_error("init failed", DriverError::CodeTooWide { bits: 128, max: 64 });
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.contains("128"));
    }

    #[test]
    fn missing_send_mode_is_usage_error() {
        let err = driver_error("send failed", DriverError::SendModeUnsupported);
        assert_eq!(err.code, USAGE);
    }
}
