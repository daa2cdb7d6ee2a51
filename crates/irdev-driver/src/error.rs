use std::path::PathBuf;

/// Errors that can occur in driver operations.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Transport-level error (stat, open, path validation).
    #[error("transport error: {0}")]
    Transport(#[from] irdev_transport::TransportError),

    /// Could not connect to a unix socket endpoint.
    #[error("could not connect to unix socket {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The endpoint is neither a socket, a FIFO, nor a character device.
    #[error("{path} is not a character device")]
    UnsupportedDeviceKind { path: PathBuf },

    /// The device did not answer the feature query.
    #[error("could not get hardware features of {path}: {source}; {hint}")]
    FeaturesUnavailable {
        path: PathBuf,
        hint: String,
        source: std::io::Error,
    },

    /// The device did not report its lirccode length.
    #[error("could not get code length: {0}")]
    CodeLengthUnavailable(std::io::Error),

    /// The device reports codes wider than a codeword can hold.
    #[error("can not handle {bits} bit codes (max {max})")]
    CodeTooWide { bits: u32, max: u32 },

    /// Negotiation selected neither a send nor a receive mode.
    #[error("driver supports neither a usable send nor receive mode")]
    NoUsableMode,

    /// `init` was called on a descriptor that is already open.
    #[error("device {0} is already open")]
    AlreadyOpen(PathBuf),

    /// The operation needs an open endpoint.
    #[error("device is not open")]
    NotOpen,

    /// Transmission requested without a pulse send mode.
    #[error("send mode not supported by device")]
    SendModeUnsupported,

    /// Reception requested without a receive mode.
    #[error("receive mode not supported by device")]
    ReceiveUnsupported,

    /// The session receives a different kind of data than was requested.
    #[error("device receives {} data", .actual.name())]
    ReceiveModeMismatch { actual: crate::mode::ReceiveMode },

    /// Setting the modulation frequency failed.
    #[error("could not set modulation frequency to {carrier} Hz: {source}")]
    CarrierSetFailed {
        carrier: u32,
        source: std::io::Error,
    },

    /// Setting the duty cycle failed.
    #[error("could not set duty cycle to {duty_cycle}%: {source}")]
    DutyCycleSetFailed {
        duty_cycle: u32,
        source: std::io::Error,
    },

    /// The encoder could not fill the send buffer.
    #[error("could not encode command")]
    EncodeFailed,

    /// Writing the send buffer failed or was short.
    #[error("write failed: {0}")]
    WriteFailed(std::io::Error),
}

pub type Result<T> = std::result::Result<T, DriverError>;
