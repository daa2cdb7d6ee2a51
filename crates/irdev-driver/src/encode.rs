use tracing::warn;

use crate::sample::{Sample, SendBuffer};

/// Fills the send buffer for a command.
///
/// The driver applies the command's carrier and duty cycle before asking
/// the encoder for durations; `None` selects the configured defaults.
pub trait Encoder {
    type Command;

    /// Carrier frequency for `command` in Hz.
    fn carrier(&self, _command: &Self::Command) -> Option<u32> {
        None
    }

    /// Duty cycle for `command` in percent.
    fn duty_cycle(&self, _command: &Self::Command) -> Option<u32> {
        None
    }

    /// Append the pulse/space durations of `command` to `buffer`.
    ///
    /// Returns `false` when the command cannot be encoded.
    fn encode(&mut self, command: &Self::Command, buffer: &mut SendBuffer) -> bool;
}

/// A pre-timed pulse train.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSignal {
    /// Alternating pulse/space durations in microseconds, starting and ending with a pulse.
    pub durations: Vec<Sample>,
    pub carrier: Option<u32>,
    pub duty_cycle: Option<u32>,
}

impl RawSignal {
    pub fn new(durations: Vec<Sample>) -> Self {
        Self {
            durations,
            ..Self::default()
        }
    }
}

/// Encoder for signals that are already expressed as durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawEncoder;

impl Encoder for RawEncoder {
    type Command = RawSignal;

    fn carrier(&self, command: &RawSignal) -> Option<u32> {
        command.carrier
    }

    fn duty_cycle(&self, command: &RawSignal) -> Option<u32> {
        command.duty_cycle
    }

    fn encode(&mut self, command: &RawSignal, buffer: &mut SendBuffer) -> bool {
        if !command.durations.is_empty() && command.durations.len() % 2 == 0 {
            warn!(
                entries = command.durations.len(),
                "pulse train must end with a pulse"
            );
            return false;
        }
        if command.durations.contains(&0) {
            warn!("pulse train contains a zero duration");
            return false;
        }
        buffer.extend_from_slice(&command.durations);
        true
    }
}
