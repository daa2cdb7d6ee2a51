use std::path::PathBuf;

/// Device node used when none is configured.
pub const DEFAULT_DEVICE: &str = "/dev/lirc0";

/// Carrier frequency used when a command does not specify one (Hz).
pub const DEFAULT_CARRIER: u32 = 38_000;

/// Duty cycle used when a command does not specify one (percent).
pub const DEFAULT_DUTY_CYCLE: u32 = 50;

/// Configuration for a [`Driver`](crate::Driver).
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Endpoint path: LIRC device node, FIFO, or unix socket.
    pub device: PathBuf,
    /// Carrier applied to commands without one. Default: 38 kHz.
    pub default_carrier: u32,
    /// Duty cycle applied to commands without one. Default: 50%.
    pub default_duty_cycle: u32,
}

impl DriverConfig {
    /// Default configuration for `device`.
    pub fn for_device(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            default_carrier: DEFAULT_CARRIER,
            default_duty_cycle: DEFAULT_DUTY_CYCLE,
        }
    }
}
