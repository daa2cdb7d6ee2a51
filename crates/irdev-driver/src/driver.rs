use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use irdev_transport::{Endpoint, EndpointKind, IrStream, TransportError};
use tracing::{debug, error, info, warn};

use crate::abi::{
    Features, LIRC_GET_FEATURES, LIRC_GET_LENGTH, LIRC_GET_REC_RESOLUTION, LIRC_SET_SEND_CARRIER,
    LIRC_SET_SEND_DUTY_CYCLE,
};
use crate::config::DriverConfig;
use crate::decode::{Decoder, Reception, SampleSource};
use crate::device::Device;
use crate::encode::Encoder;
use crate::error::{DriverError, Result};
use crate::mode::{Negotiation, ReceiveMode, Selection, SendMode};
use crate::sample::{Code, Sample, SendBuffer, CODEWORD_BITS, CODE_SIZE, SAMPLE_SIZE};

/// Driver name reported to the IR stack.
pub const DRIVER_NAME: &str = "default";
/// Driver version reported to the IR stack.
pub const DRIVER_VERSION: &str = "0.9.2";
/// Driver plugin API version.
pub const API_VERSION: u32 = 2;

/// Character-device major of the kernel input subsystem (`/dev/input/*`).
const INPUT_MAJOR: u32 = 13;

/// Result of a successful [`Driver::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The encoder produced no durations; nothing was written.
    Empty,
    /// The whole buffer was written in one operation.
    Sent { samples: usize },
}

/// Session state for one IR device: the endpoint handle plus everything
/// negotiated when it was opened.
///
/// Callers own the driver and serialize access through `&mut self`.
/// All negotiated fields reset when the endpoint is closed.
pub struct Driver<D = IrStream> {
    config: DriverConfig,
    handle: Option<D>,
    kind: Option<EndpointKind>,
    features: Features,
    send_mode: Option<SendMode>,
    receive_mode: Option<ReceiveMode>,
    resolution: u32,
    code_length: u32,
    negotiation: Negotiation,
    invalid_sample_warned: bool,
    invalid_samples: u64,
}

impl<D> Driver<D> {
    /// Create a closed driver for the configured device.
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            handle: None,
            kind: None,
            features: Features::empty(),
            send_mode: None,
            receive_mode: None,
            resolution: 0,
            code_length: 0,
            negotiation: Negotiation::none(),
            invalid_sample_warned: false,
            invalid_samples: 0,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn device_path(&self) -> &Path {
        &self.config.device
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Kind of the open endpoint.
    pub fn kind(&self) -> Option<EndpointKind> {
        self.kind
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn send_mode(&self) -> Option<SendMode> {
        self.send_mode
    }

    pub fn receive_mode(&self) -> Option<ReceiveMode> {
        self.receive_mode
    }

    /// Receiver resolution in microseconds, `0` when unknown.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Bit length of lirccode words, `0` outside lirccode mode.
    pub fn code_length(&self) -> u32 {
        self.code_length
    }

    pub fn negotiation(&self) -> Negotiation {
        self.negotiation
    }

    /// Zero samples replaced since the endpoint was opened.
    pub fn invalid_samples(&self) -> u64 {
        self.invalid_samples
    }

    /// Close the endpoint and reset negotiated state.
    ///
    /// Calling this on a closed driver does nothing.
    pub fn deinit(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        drop(handle);
        debug!(path = ?self.config.device, "closed device");
        self.reset();
    }

    fn reset(&mut self) {
        self.kind = None;
        self.features = Features::empty();
        self.send_mode = None;
        self.receive_mode = None;
        self.resolution = 0;
        self.code_length = 0;
        self.negotiation = Negotiation::none();
        self.invalid_sample_warned = false;
        self.invalid_samples = 0;
    }

    fn apply_negotiation(&mut self, features: Features) {
        self.features = features;
        self.negotiation = Negotiation::from_features(features);
        self.send_mode = self.negotiation.send.mode();
        self.receive_mode = self.negotiation.receive.mode();
    }
}

impl Driver<IrStream> {
    /// Convenience constructor with default settings for `device`.
    pub fn with_device(device: impl AsRef<Path>) -> Self {
        Self::new(DriverConfig::for_device(device.as_ref()))
    }

    /// Open the configured endpoint and negotiate its capabilities.
    ///
    /// On failure the driver stays closed.
    pub fn init(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(DriverError::AlreadyOpen(self.config.device.clone()));
        }

        let endpoint = Endpoint::open(&self.config.device).map_err(|err| {
            error!(path = ?self.config.device, error = %err, "could not open device");
            match err {
                TransportError::Connect { path, source } => DriverError::Connect { path, source },
                other => DriverError::Transport(other),
            }
        })?;

        let (kind, stream) = endpoint.into_parts();
        self.attach(stream, kind)
    }
}

impl<D: Device> Driver<D> {
    /// Take ownership of an already-opened endpoint of `kind` and set it up.
    ///
    /// Sockets and FIFOs get fixed capabilities; character devices are
    /// interrogated through the control channel. On failure the endpoint is
    /// closed and the driver stays closed.
    pub fn attach(&mut self, device: D, kind: EndpointKind) -> Result<()> {
        if self.is_open() {
            return Err(DriverError::AlreadyOpen(self.config.device.clone()));
        }
        self.reset();

        match kind {
            EndpointKind::Socket => {
                self.handle = Some(device);
                self.kind = Some(kind);
                self.apply_negotiation(Features::CAN_REC_MODE2 | Features::CAN_SEND_PULSE);
                debug!(path = ?self.config.device, "using unix socket lirc device");
                Ok(())
            }
            EndpointKind::Fifo => {
                self.handle = Some(device);
                self.kind = Some(kind);
                self.apply_negotiation(Features::CAN_REC_MODE2);
                debug!(path = ?self.config.device, "using mode2 defaults for fifo");
                Ok(())
            }
            EndpointKind::Other => {
                drop(device);
                error!(path = ?self.config.device, "not a character device");
                Err(DriverError::UnsupportedDeviceKind {
                    path: self.config.device.clone(),
                })
            }
            EndpointKind::CharDevice { major, .. } => {
                self.handle = Some(device);
                self.kind = Some(kind);
                let result = self.negotiate(major);
                if result.is_err() {
                    self.deinit();
                }
                result
            }
        }
    }

    fn negotiate(&mut self, major: u32) -> Result<()> {
        let features = match self.query(LIRC_GET_FEATURES) {
            Ok(bits) => Features::from_bits_retain(bits),
            Err(source) => {
                let path = self.config.device.clone();
                let hint = device_class_hint(&path, major);
                error!(?path, error = %source, "could not get hardware features");
                error!("this device driver does not support the LIRC ioctl interface");
                error!("{hint}");
                return Err(DriverError::FeaturesUnavailable { path, hint, source });
            }
        };

        log_capabilities(features);
        self.apply_negotiation(features);

        if self.negotiation.send == Selection::Unsupported {
            info!(features = %features, "the send method of the driver is not yet supported");
        }
        if self.negotiation.receive == Selection::Unsupported {
            info!(features = %features, "the receive method of the driver is not yet supported");
        }

        match self.receive_mode {
            Some(ReceiveMode::Mode2) => {
                self.resolution = 0;
                if features.contains(Features::CAN_GET_REC_RESOLUTION) {
                    match self.query(LIRC_GET_REC_RESOLUTION) {
                        Ok(resolution) => {
                            self.resolution = resolution;
                            debug!(resolution, "resolution of receiver");
                        }
                        Err(err) => debug!(error = %err, "could not get receiver resolution"),
                    }
                }
            }
            Some(ReceiveMode::LircCode) => {
                let bits = self.query(LIRC_GET_LENGTH).map_err(|source| {
                    error!(error = %source, "could not get code length");
                    DriverError::CodeLengthUnavailable(source)
                })?;
                if bits > CODEWORD_BITS {
                    error!(bits, max = CODEWORD_BITS, "can not handle codes this wide");
                    return Err(DriverError::CodeTooWide {
                        bits,
                        max: CODEWORD_BITS,
                    });
                }
                self.code_length = bits;
            }
            None => {}
        }

        if !self.negotiation.is_usable() {
            error!(features = %features, "driver supports neither a usable send nor receive mode");
            return Err(DriverError::NoUsableMode);
        }

        info!(
            path = ?self.config.device,
            send = self.send_mode.map(SendMode::name),
            receive = self.receive_mode.map(ReceiveMode::name),
            "negotiated device modes"
        );
        Ok(())
    }

    /// Transmit `command`: apply its modulation, encode it into `buffer`,
    /// and write the buffer to the device in one operation.
    ///
    /// Failures leave the endpoint open.
    pub fn send<E: Encoder>(
        &mut self,
        encoder: &mut E,
        command: &E::Command,
        buffer: &mut SendBuffer,
    ) -> Result<SendOutcome> {
        if self.send_mode != Some(SendMode::Pulse) {
            return Err(DriverError::SendModeUnsupported);
        }

        if self.features.contains(Features::CAN_SET_SEND_CARRIER) {
            let carrier = encoder
                .carrier(command)
                .filter(|&carrier| carrier != 0)
                .unwrap_or(self.config.default_carrier);
            self.command(LIRC_SET_SEND_CARRIER, carrier)
                .map_err(|source| {
                    error!(carrier, error = %source, "could not set modulation frequency");
                    DriverError::CarrierSetFailed { carrier, source }
                })?;
        }
        if self.features.contains(Features::CAN_SET_SEND_DUTY_CYCLE) {
            let duty_cycle = encoder
                .duty_cycle(command)
                .filter(|&duty_cycle| duty_cycle != 0)
                .unwrap_or(self.config.default_duty_cycle);
            self.command(LIRC_SET_SEND_DUTY_CYCLE, duty_cycle)
                .map_err(|source| {
                    error!(duty_cycle, error = %source, "could not set duty cycle");
                    DriverError::DutyCycleSetFailed { duty_cycle, source }
                })?;
        }

        buffer.clear();
        if !encoder.encode(command, buffer) {
            return Err(DriverError::EncodeFailed);
        }
        if buffer.is_empty() {
            debug!("nothing to send");
            return Ok(SendOutcome::Empty);
        }

        let bytes = buffer.to_bytes();
        let handle = self.handle.as_mut().ok_or(DriverError::NotOpen)?;
        match std::io::Write::write(handle, &bytes) {
            Ok(written) if written == bytes.len() => {
                debug!(samples = buffer.len(), "sent pulse train");
                Ok(SendOutcome::Sent {
                    samples: buffer.len(),
                })
            }
            Ok(written) => {
                error!(written, expected = bytes.len(), "write failed");
                Err(DriverError::WriteFailed(std::io::Error::new(
                    ErrorKind::WriteZero,
                    format!("short write ({written} of {} bytes)", bytes.len()),
                )))
            }
            Err(err) => {
                error!(error = %err, "write failed");
                Err(DriverError::WriteFailed(err))
            }
        }
    }

    /// Wait up to `timeout` for input and read one sample.
    ///
    /// `None` waits indefinitely. A failed or short read closes the endpoint
    /// and yields [`Reception::Closed`]; the caller must `init` again.
    pub fn read_sample(&mut self, timeout: Option<Duration>) -> Result<Reception> {
        if !self.is_open() {
            return Err(DriverError::NotOpen);
        }
        if self.receive_mode.is_none() {
            return Err(DriverError::ReceiveUnsupported);
        }

        let mut buf = [0u8; SAMPLE_SIZE];
        if let Some(status) = self.read_unit(&mut buf, timeout) {
            return Ok(status);
        }

        let mut sample = Sample::from_ne_bytes(buf);
        if sample == 0 {
            self.invalid_samples += 1;
            if !self.invalid_sample_warned {
                warn!(path = ?self.config.device, "read invalid data from device");
                self.invalid_sample_warned = true;
            }
            sample = 1;
        }
        Ok(Reception::Data(sample))
    }

    /// Wait up to `timeout` for input and read one whole lirccode code word.
    ///
    /// Reads `code_length` rounded up to whole bytes, most significant byte
    /// first. Failures close the endpoint like [`Driver::read_sample`].
    pub fn read_code(&mut self, timeout: Option<Duration>) -> Result<Reception<Code>> {
        if !self.is_open() {
            return Err(DriverError::NotOpen);
        }
        match self.receive_mode {
            None => return Err(DriverError::ReceiveUnsupported),
            Some(ReceiveMode::LircCode) => {}
            Some(actual) => return Err(DriverError::ReceiveModeMismatch { actual }),
        }

        let mut buf = [0u8; CODE_SIZE];
        let len = self.code_bytes();
        if let Some(status) = self.read_unit(&mut buf[..len], timeout) {
            return Ok(status);
        }

        let code = buf[..len]
            .iter()
            .fold(0, |code: Code, &byte| (code << 8) | Code::from(byte));
        Ok(Reception::Data(code))
    }

    /// Bytes per lirccode code word.
    pub fn code_bytes(&self) -> usize {
        (self.code_length.div_ceil(8) as usize).clamp(1, CODE_SIZE)
    }

    /// Wait for input and fill `buf` in one read.
    ///
    /// Returns `None` when `buf` was filled, otherwise the reception to hand
    /// back. A failed wait or a short read tears the session down.
    fn read_unit<T>(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Option<Reception<T>> {
        let Some(handle) = self.handle.as_mut() else {
            return Some(Reception::Closed);
        };

        match handle.wait_readable(timeout) {
            Ok(true) => {}
            Ok(false) => return Some(Reception::Timeout),
            Err(err) => {
                error!(path = ?self.config.device, error = %err, "error waiting for data");
                self.deinit();
                return Some(Reception::Closed);
            }
        }

        let expected = buf.len();
        match std::io::Read::read(handle, buf) {
            Ok(read) if read == expected => None,
            Ok(read) => {
                error!(
                    path = ?self.config.device,
                    ret = read,
                    expected,
                    "error reading from device"
                );
                self.deinit();
                Some(Reception::Closed)
            }
            Err(err) => {
                error!(
                    path = ?self.config.device,
                    ret = -1,
                    expected,
                    error = %err,
                    "error reading from device"
                );
                self.deinit();
                Some(Reception::Closed)
            }
        }
    }

    /// Refill the decoder's buffer from the device, then decode.
    ///
    /// Returns `None` without touching the session when it is closed or its
    /// receive mode is not one the decoder accepts. If the buffer cannot be
    /// refilled the endpoint is closed and `None` is returned. Otherwise the
    /// decoder's result is returned unchanged.
    pub fn receive<R: Decoder>(&mut self, decoder: &mut R) -> Option<R::Output> {
        if !self.is_open() {
            return None;
        }
        match self.receive_mode {
            Some(mode) if decoder.accepts(mode) => {}
            _ => return None,
        }
        if !decoder.clear_buffer(self) {
            self.deinit();
            return None;
        }
        decoder.decode(self)
    }

    /// Issue a raw control request that reads back one `u32`.
    pub fn control_get(&mut self, request: u32) -> Result<u32> {
        if !self.is_open() {
            return Err(DriverError::NotOpen);
        }
        self.query(request)
            .map_err(|err| DriverError::Transport(TransportError::Io(err)))
    }

    /// Issue a raw control request that passes one `u32` to the device.
    pub fn control_set(&mut self, request: u32, value: u32) -> Result<()> {
        if !self.is_open() {
            return Err(DriverError::NotOpen);
        }
        self.command(request, value)
            .map_err(|err| DriverError::Transport(TransportError::Io(err)))
    }

    fn query(&mut self, request: u32) -> std::io::Result<u32> {
        match self.handle.as_mut() {
            Some(handle) => handle.control_get(request),
            None => Err(not_open()),
        }
    }

    fn command(&mut self, request: u32, value: u32) -> std::io::Result<()> {
        match self.handle.as_mut() {
            Some(handle) => handle.control_set(request, value),
            None => Err(not_open()),
        }
    }
}

impl<D: Device> SampleSource for Driver<D> {
    fn read_sample(&mut self, timeout: Option<Duration>) -> Result<Reception> {
        Driver::read_sample(self, timeout)
    }

    fn read_code(&mut self, timeout: Option<Duration>) -> Result<Reception<Code>> {
        Driver::read_code(self, timeout)
    }
}

impl<D> std::fmt::Debug for Driver<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("device", &self.config.device)
            .field("open", &self.is_open())
            .field("kind", &self.kind)
            .field("features", &self.features)
            .field("send_mode", &self.send_mode)
            .field("receive_mode", &self.receive_mode)
            .field("resolution", &self.resolution)
            .field("code_length", &self.code_length)
            .finish()
    }
}

fn not_open() -> std::io::Error {
    std::io::Error::new(ErrorKind::NotConnected, "device is not open")
}

fn log_capabilities(features: Features) {
    match (features.can_send(), features.can_receive()) {
        (true, true) => debug!("driver supports both sending and receiving"),
        (true, false) => debug!("driver supports sending"),
        (false, true) => debug!("driver supports receiving"),
        (false, false) => debug!("driver supports neither sending nor receiving of IR signals"),
    }
}

/// Suggest what the user probably meant when a device rejects the feature query.
fn device_class_hint(path: &Path, major: u32) -> String {
    if major == INPUT_MAJOR {
        format!("did you mean to use the devinput driver instead of the {DRIVER_NAME} driver?")
    } else {
        format!(
            "major number of {} is {major}; make sure it is a LIRC device and use a current version of the driver",
            path.display()
        )
    }
}


#[cfg(test)]
mod endpoint_tests {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::net::UnixListener;
    use std::path::PathBuf;

    use super::*;
    use crate::encode::{RawEncoder, RawSignal};
    use std::io::{Read, Write};

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "irdev-driver-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    fn mkfifo(path: &Path) {
        let c_path = CString::new(path.as_os_str().as_bytes()).expect("path has no NUL");
        // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
        let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) };
        assert_eq!(rc, 0, "mkfifo should succeed");
    }

    #[test]
    fn fifo_samples_are_read_and_corrected() {
        let dir = unique_temp_dir("fifo");
        let fifo = dir.join("ir.fifo");
        mkfifo(&fifo);

        let mut driver = Driver::with_device(&fifo);
        driver.init().unwrap();
        assert_eq!(driver.kind(), Some(EndpointKind::Fifo));

        let mut writer = std::fs::OpenOptions::new().write(true).open(&fifo).unwrap();
        writer.write_all(&0u32.to_ne_bytes()).unwrap();
        writer.write_all(&0x0100_0384u32.to_ne_bytes()).unwrap();

        let timeout = Some(Duration::from_secs(1));
        assert_eq!(driver.read_sample(timeout).unwrap(), Reception::Data(1));
        assert_eq!(
            driver.read_sample(timeout).unwrap(),
            Reception::Data(0x0100_0384)
        );
        assert_eq!(
            driver.read_sample(Some(Duration::from_millis(20))).unwrap(),
            Reception::Timeout
        );

        writer.write_all(&[0xaa, 0xbb]).unwrap();
        assert_eq!(driver.read_sample(timeout).unwrap(), Reception::Closed);
        assert!(!driver.is_open());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn socket_endpoint_transmits_pulse_train() {
        let dir = unique_temp_dir("sock");
        let sock_path = dir.join("ir.sock");
        let listener = UnixListener::bind(&sock_path).unwrap();

        let mut driver = Driver::with_device(&sock_path);
        driver.init().unwrap();
        assert_eq!(driver.send_mode(), Some(SendMode::Pulse));
        assert_eq!(driver.receive_mode(), Some(ReceiveMode::Mode2));

        let (mut server, _) = listener.accept().unwrap();
        let outcome = driver
            .send(
                &mut RawEncoder,
                &RawSignal::new(vec![900, 450, 900]),
                &mut SendBuffer::new(),
            )
            .unwrap();
        assert_eq!(outcome, SendOutcome::Sent { samples: 3 });

        let mut buf = [0u8; 3 * SAMPLE_SIZE];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf[..4], &900u32.to_ne_bytes());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn stale_socket_is_connect_error() {
        let dir = unique_temp_dir("stale");
        let sock_path = dir.join("stale.sock");
        drop(UnixListener::bind(&sock_path).unwrap());

        let mut driver = Driver::with_device(&sock_path);
        assert!(matches!(driver.init(), Err(DriverError::Connect { .. })));
        assert!(!driver.is_open());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn regular_file_is_unsupported() {
        let dir = unique_temp_dir("file");
        let file = dir.join("plain");
        std::fs::write(&file, b"not a device").unwrap();

        let mut driver = Driver::with_device(&file);
        assert!(matches!(
            driver.init(),
            Err(DriverError::UnsupportedDeviceKind { .. })
        ));
        assert!(!driver.is_open());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn non_lirc_char_device_has_no_features() {
        let mut driver = Driver::with_device("/dev/null");
        let err = driver.init().unwrap_err();

        assert!(matches!(err, DriverError::FeaturesUnavailable { .. }));
        assert!(err.to_string().contains("major number of /dev/null is 1"));
        assert!(!driver.is_open());
    }

    #[test]
    fn missing_device_is_stat_error() {
        let mut driver = Driver::with_device("/nonexistent/irdev/lirc0");
        assert!(matches!(
            driver.init(),
            Err(DriverError::Transport(TransportError::Stat { .. }))
        ));
    }
}
