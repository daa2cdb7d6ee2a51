//! LIRC device driver core.
//!
//! Opens an IR endpoint, negotiates which encodings it can send and
//! receive, then moves pulse data in both directions:
//! - [`Driver::init`] classifies the endpoint and negotiates modes
//! - [`Driver::send`] applies modulation settings and writes a pulse train
//! - [`Driver::read_sample`] waits for and reads one raw sample
//! - [`Driver::receive`] feeds a [`Decoder`] from the device
//! - [`Driver::deinit`] closes the endpoint
//!
//! Protocol encoding and decoding stay outside this crate, behind the
//! [`Encoder`] and [`Decoder`] traits.

#![cfg(unix)]

pub mod abi;
pub mod config;
pub mod decode;
pub mod device;
pub mod driver;
pub mod encode;
pub mod error;
pub mod mode;
pub mod sample;

#[cfg(test)]
mod mock;

pub use abi::Features;
pub use config::{DriverConfig, DEFAULT_CARRIER, DEFAULT_DEVICE, DEFAULT_DUTY_CYCLE};
pub use decode::{Capture, CodeCapture, Decoder, Reception, SampleSource};
pub use device::Device;
pub use driver::{Driver, SendOutcome, API_VERSION, DRIVER_NAME, DRIVER_VERSION};
pub use encode::{Encoder, RawEncoder, RawSignal};
pub use error::{DriverError, Result};
pub use mode::{Negotiation, ReceiveMode, Selection, SendMode, RECEIVE_MODES, SEND_MODES};
pub use sample::{
    Code, Mode2Kind, Mode2Sample, Sample, SendBuffer, CODEWORD_BITS, CODE_SIZE, SAMPLE_SIZE,
};
