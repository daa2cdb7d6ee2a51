use bytes::{BufMut, Bytes, BytesMut};

/// One transmitted duration or received sample, as exchanged with the device.
pub type Sample = u32;

/// One lirccode code word, right-aligned.
pub type Code = u64;

/// Size in bytes of one [`Sample`] on the wire.
pub const SAMPLE_SIZE: usize = std::mem::size_of::<Sample>();

/// Size in bytes of the [`Code`] container.
pub const CODE_SIZE: usize = std::mem::size_of::<Code>();

/// Bit width of the codeword container used for lirccode values.
pub const CODEWORD_BITS: u32 = Code::BITS;

const MODE2_VALUE_MASK: u32 = 0x00ff_ffff;

/// What a mode2 sample measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode2Kind {
    Space,
    Pulse,
    Frequency,
    Timeout,
    Unknown(u8),
}

/// A mode2 sample split into its type byte and 24-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode2Sample {
    pub kind: Mode2Kind,
    pub value: u32,
}

impl From<Sample> for Mode2Sample {
    fn from(sample: Sample) -> Self {
        let kind = match (sample >> 24) as u8 {
            0x00 => Mode2Kind::Space,
            0x01 => Mode2Kind::Pulse,
            0x02 => Mode2Kind::Frequency,
            0x03 => Mode2Kind::Timeout,
            other => Mode2Kind::Unknown(other),
        };
        Self {
            kind,
            value: sample & MODE2_VALUE_MASK,
        }
    }
}

impl std::fmt::Display for Mode2Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            Mode2Kind::Space => write!(f, "space {}", self.value),
            Mode2Kind::Pulse => write!(f, "pulse {}", self.value),
            Mode2Kind::Frequency => write!(f, "carrier {}", self.value),
            Mode2Kind::Timeout => write!(f, "timeout {}", self.value),
            Mode2Kind::Unknown(tag) => write!(f, "unknown {tag:#04x} {}", self.value),
        }
    }
}

/// Durations waiting to be written to the device.
///
/// Entries alternate pulse, space, pulse, ... by position. The write cursor
/// is the number of populated entries; an empty buffer is a valid no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendBuffer {
    data: Vec<Sample>,
}

impl SendBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the write cursor to zero.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn push(&mut self, duration: Sample) {
        self.data.push(duration);
    }

    pub fn extend_from_slice(&mut self, durations: &[Sample]) {
        self.data.extend_from_slice(durations);
    }

    /// Number of populated entries (the write cursor).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.data
    }

    /// Serialize the populated entries in native byte order.
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.data.len() * SAMPLE_SIZE);
        for duration in &self.data {
            dst.put_slice(&duration.to_ne_bytes());
        }
        dst.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode2_sample_splits_type_and_value() {
        let pulse = Mode2Sample::from(0x0100_0384);
        assert_eq!(pulse.kind, Mode2Kind::Pulse);
        assert_eq!(pulse.value, 900);
        assert_eq!(pulse.to_string(), "pulse 900");

        let space = Mode2Sample::from(450);
        assert_eq!(space.kind, Mode2Kind::Space);
        assert_eq!(space.to_string(), "space 450");

        let timeout = Mode2Sample::from(0x0300_2710);
        assert_eq!(timeout.kind, Mode2Kind::Timeout);
        assert_eq!(timeout.value, 10_000);
    }

    #[test]
    fn send_buffer_serializes_populated_entries() {
        let mut buffer = SendBuffer::new();
        buffer.extend_from_slice(&[900, 450, 900]);

        let bytes = buffer.to_bytes();
        assert_eq!(bytes.len(), 3 * SAMPLE_SIZE);
        assert_eq!(&bytes[4..8], &450u32.to_ne_bytes());
    }

    #[test]
    fn cleared_buffer_is_empty() {
        let mut buffer = SendBuffer::new();
        buffer.push(560);
        buffer.clear();

        assert!(buffer.is_empty());
        assert!(buffer.to_bytes().is_empty());
    }
}
