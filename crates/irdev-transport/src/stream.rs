use std::io::{ErrorKind, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::time::{Duration, Instant};

use crate::error::Result;

/// A connected IR endpoint: implements Read + Write plus the LIRC control channel.
///
/// Wraps either a unix stream socket or an opened device/FIFO file.
pub struct IrStream {
    inner: IrStreamInner,
}

enum IrStreamInner {
    Unix(std::os::unix::net::UnixStream),
    File(std::fs::File),
}

impl Read for IrStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            IrStreamInner::Unix(stream) => stream.read(buf),
            IrStreamInner::File(file) => file.read(buf),
        }
    }
}

impl Write for IrStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            IrStreamInner::Unix(stream) => stream.write(buf),
            IrStreamInner::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            IrStreamInner::Unix(stream) => stream.flush(),
            IrStreamInner::File(file) => file.flush(),
        }
    }
}

impl AsRawFd for IrStream {
    fn as_raw_fd(&self) -> RawFd {
        match &self.inner {
            IrStreamInner::Unix(stream) => stream.as_raw_fd(),
            IrStreamInner::File(file) => file.as_raw_fd(),
        }
    }
}

impl IrStream {
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: IrStreamInner::Unix(stream),
        }
    }

    pub(crate) fn from_file(file: std::fs::File) -> Self {
        Self {
            inner: IrStreamInner::File(file),
        }
    }

    /// Wait until the stream has data to read.
    ///
    /// Returns `Ok(false)` when `timeout` expires first. `None` waits
    /// indefinitely. Interrupted waits are resumed with the remaining time.
    pub fn wait_readable(&self, timeout: Option<Duration>) -> Result<bool> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let fd = self.as_raw_fd();

        loop {
            let timeout_ms = match deadline {
                None => -1,
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    remaining
                        .as_micros()
                        .div_ceil(1000)
                        .min(libc::c_int::MAX as u128) as libc::c_int
                }
            };

            let mut pollfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };

            // SAFETY: `pollfd` is a valid, writable pollfd and we pass a count of 1.
            let rc = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
            if rc < 0 {
                let err = std::io::Error::last_os_error();
                if err.kind() == ErrorKind::Interrupted {
                    continue;
                }
                return Err(err.into());
            }
            return Ok(rc > 0);
        }
    }

    /// Issue a control request that reads back one `u32`.
    pub fn ioctl_read_u32(&self, request: u32) -> Result<u32> {
        let mut value: u32 = 0;
        // SAFETY: `value` is a valid writable u32 and every read request used with this
        // method is encoded with a `__u32` argument size.
        let rc = unsafe {
            libc::ioctl(
                self.as_raw_fd(),
                request as _,
                &mut value as *mut u32,
            )
        };
        if rc == -1 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(value)
    }

    /// Issue a control request that passes one `u32` to the device.
    pub fn ioctl_write_u32(&self, request: u32, value: u32) -> Result<()> {
        let mut value = value;
        // SAFETY: `value` outlives the call and matches the request's `__u32` argument size.
        let rc = unsafe {
            libc::ioctl(
                self.as_raw_fd(),
                request as _,
                &mut value as *mut u32,
            )
        };
        if rc == -1 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(())
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            IrStreamInner::Unix(_) => "unix-socket",
            IrStreamInner::File(_) => "file",
        }
    }
}

impl std::fmt::Debug for IrStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrStream")
            .field("type", &self.transport_name())
            .field("fd", &self.as_raw_fd())
            .finish()
    }
}
