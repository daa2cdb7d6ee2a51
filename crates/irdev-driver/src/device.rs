use std::io::{Read, Write};
use std::time::Duration;

use irdev_transport::{IrStream, TransportError};

/// An open IR endpoint the driver can control, read and write.
///
/// Implemented for [`IrStream`]; tests substitute scripted devices.
pub trait Device: Read + Write {
    /// Issue a control request that reads back one `u32`.
    fn control_get(&mut self, request: u32) -> std::io::Result<u32>;

    /// Issue a control request that passes one `u32` to the device.
    fn control_set(&mut self, request: u32, value: u32) -> std::io::Result<()>;

    /// Wait until a read would not block. `Ok(false)` means the timeout expired.
    fn wait_readable(&mut self, timeout: Option<Duration>) -> std::io::Result<bool>;
}

impl Device for IrStream {
    fn control_get(&mut self, request: u32) -> std::io::Result<u32> {
        self.ioctl_read_u32(request).map_err(into_io)
    }

    fn control_set(&mut self, request: u32, value: u32) -> std::io::Result<()> {
        self.ioctl_write_u32(request, value).map_err(into_io)
    }

    fn wait_readable(&mut self, timeout: Option<Duration>) -> std::io::Result<bool> {
        IrStream::wait_readable(self, timeout).map_err(into_io)
    }
}

fn into_io(err: TransportError) -> std::io::Error {
    match err {
        TransportError::Io(io) => io,
        TransportError::Stat { source, .. }
        | TransportError::Open { source, .. }
        | TransportError::Connect { source, .. } => source,
        other => std::io::Error::other(other.to_string()),
    }
}
