//! Scripted [`Device`] and log capture for driver tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::abi::{LIRC_GET_FEATURES, LIRC_GET_LENGTH, LIRC_GET_REC_RESOLUTION};
use crate::device::Device;

pub(crate) enum ReadStep {
    Data(Vec<u8>),
    Timeout,
    Error,
}

#[derive(Default)]
pub(crate) struct MockState {
    pub features: Option<u32>,
    pub resolution: Option<u32>,
    pub length: Option<u32>,
    pub failing_sets: Vec<u32>,
    pub reads: VecDeque<ReadStep>,
    pub write_limit: Option<usize>,

    pub queries: Vec<u32>,
    pub sets: Vec<(u32, u32)>,
    pub writes: Vec<Vec<u8>>,
    pub drops: usize,
}

impl MockState {
    pub fn with_features(features: u32) -> Self {
        Self {
            features: Some(features),
            ..Self::default()
        }
    }

    pub fn push_sample(&mut self, sample: u32) {
        self.reads
            .push_back(ReadStep::Data(sample.to_ne_bytes().to_vec()));
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.reads.push_back(ReadStep::Data(bytes.to_vec()));
    }
}

pub(crate) struct MockDevice {
    state: Rc<RefCell<MockState>>,
}

impl MockDevice {
    pub fn new(state: MockState) -> (Self, Rc<RefCell<MockState>>) {
        let state = Rc::new(RefCell::new(state));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

fn not_supported() -> std::io::Error {
    std::io::Error::from_raw_os_error(libc::ENOTTY)
}

impl Device for MockDevice {
    fn control_get(&mut self, request: u32) -> std::io::Result<u32> {
        let mut state = self.state.borrow_mut();
        state.queries.push(request);
        let value = match request {
            LIRC_GET_FEATURES => state.features,
            LIRC_GET_REC_RESOLUTION => state.resolution,
            LIRC_GET_LENGTH => state.length,
            _ => None,
        };
        value.ok_or_else(not_supported)
    }

    fn control_set(&mut self, request: u32, value: u32) -> std::io::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.failing_sets.contains(&request) {
            return Err(std::io::Error::from_raw_os_error(libc::EINVAL));
        }
        state.sets.push((request, value));
        Ok(())
    }

    fn wait_readable(&mut self, _timeout: Option<Duration>) -> std::io::Result<bool> {
        let mut state = self.state.borrow_mut();
        match state.reads.front() {
            None => Ok(false),
            Some(ReadStep::Timeout) => {
                state.reads.pop_front();
                Ok(false)
            }
            Some(_) => Ok(true),
        }
    }
}

impl Read for MockDevice {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.state.borrow_mut().reads.pop_front() {
            Some(ReadStep::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(ReadStep::Error) => Err(std::io::Error::from_raw_os_error(libc::ENODEV)),
            Some(ReadStep::Timeout) | None => Ok(0),
        }
    }
}

impl Write for MockDevice {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut state = self.state.borrow_mut();
        let n = state.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        state.writes.push(buf[..n].to_vec());
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.state.borrow_mut().drops += 1;
    }
}

/// Formatted log output collected while a closure runs.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log buffer lock");
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn count(&self, message: &str) -> usize {
        self.contents().matches(message).count()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return what it logged.
pub(crate) fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, LogCapture) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture)
}
