use std::time::Duration;

use crate::error::Result;
use crate::mode::ReceiveMode;
use crate::sample::{Code, Sample};

/// Result of one timed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reception<T = Sample> {
    /// Data arrived. Zero mode2 samples have already been replaced by `1`.
    Data(T),
    /// The timeout expired with no data.
    Timeout,
    /// The read failed; the endpoint has been closed.
    Closed,
}

impl<T> Reception<T> {
    /// The received value, if one arrived.
    pub fn data(self) -> Option<T> {
        match self {
            Self::Data(value) => Some(value),
            _ => None,
        }
    }
}

/// Something decoders can pull raw input from.
pub trait SampleSource {
    /// Wait up to `timeout` (forever when `None`) and read one mode2 sample.
    fn read_sample(&mut self, timeout: Option<Duration>) -> Result<Reception>;

    /// Wait up to `timeout` (forever when `None`) and read one whole
    /// lirccode code word.
    fn read_code(&mut self, timeout: Option<Duration>) -> Result<Reception<Code>>;
}

/// Turns raw input into decoded results.
pub trait Decoder {
    type Output;

    /// Whether this decoder understands input in `mode`.
    ///
    /// The driver never feeds a decoder a mode it does not accept.
    fn accepts(&self, mode: ReceiveMode) -> bool;

    /// Prepare a fresh receive buffer, pulling pending input from `source`.
    ///
    /// Returns `false` when the source failed; the driver then closes it.
    fn clear_buffer(&mut self, source: &mut dyn SampleSource) -> bool;

    /// Decode the buffered input, reading more from `source` as needed.
    fn decode(&mut self, source: &mut dyn SampleSource) -> Option<Self::Output>;
}

/// Collects one signal: every sample up to the first silence longer than `gap`.
#[derive(Debug, Clone)]
pub struct Capture {
    wait: Option<Duration>,
    gap: Duration,
    max_samples: usize,
    buffer: Vec<Sample>,
}

impl Capture {
    /// Default cap on samples per signal.
    pub const DEFAULT_MAX_SAMPLES: usize = 1024;

    /// Wait up to `wait` for a signal to start; end it after `gap` of silence.
    pub fn new(wait: Option<Duration>, gap: Duration) -> Self {
        Self {
            wait,
            gap,
            max_samples: Self::DEFAULT_MAX_SAMPLES,
            buffer: Vec::new(),
        }
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples.max(1);
        self
    }
}

impl Decoder for Capture {
    type Output = Vec<Sample>;

    fn accepts(&self, mode: ReceiveMode) -> bool {
        mode == ReceiveMode::Mode2
    }

    fn clear_buffer(&mut self, source: &mut dyn SampleSource) -> bool {
        self.buffer.clear();
        match source.read_sample(self.wait) {
            Ok(Reception::Data(sample)) => {
                self.buffer.push(sample);
                true
            }
            Ok(Reception::Timeout) => true,
            Ok(Reception::Closed) | Err(_) => false,
        }
    }

    fn decode(&mut self, source: &mut dyn SampleSource) -> Option<Vec<Sample>> {
        if self.buffer.is_empty() {
            return None;
        }
        while self.buffer.len() < self.max_samples {
            match source.read_sample(Some(self.gap)) {
                Ok(Reception::Data(sample)) => self.buffer.push(sample),
                Ok(Reception::Timeout) | Ok(Reception::Closed) | Err(_) => break,
            }
        }
        Some(std::mem::take(&mut self.buffer))
    }
}

/// Receives one lirccode code word per call.
#[derive(Debug, Clone, Default)]
pub struct CodeCapture {
    wait: Option<Duration>,
    code: Option<Code>,
}

impl CodeCapture {
    /// Wait up to `wait` for a code word; `None` waits forever.
    pub fn new(wait: Option<Duration>) -> Self {
        Self { wait, code: None }
    }
}

impl Decoder for CodeCapture {
    type Output = Code;

    fn accepts(&self, mode: ReceiveMode) -> bool {
        mode == ReceiveMode::LircCode
    }

    fn clear_buffer(&mut self, source: &mut dyn SampleSource) -> bool {
        self.code = None;
        match source.read_code(self.wait) {
            Ok(Reception::Data(code)) => {
                self.code = Some(code);
                true
            }
            Ok(Reception::Timeout) => true,
            Ok(Reception::Closed) | Err(_) => false,
        }
    }

    fn decode(&mut self, _source: &mut dyn SampleSource) -> Option<Code> {
        self.code.take()
    }
}
