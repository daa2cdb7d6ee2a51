//! Supported encodings and the tables used to pick them from a feature mask.

use crate::abi::{Features, LIRC_MODE_LIRCCODE, LIRC_MODE_MODE2, LIRC_MODE_PULSE};

/// Transmit encodings this driver can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    /// Alternating pulse/space durations in microseconds.
    Pulse,
}

/// Receive encodings this driver can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveMode {
    /// Timed pulses: one tagged duration per sample.
    Mode2,
    /// Fixed-length code words decoded by the hardware.
    LircCode,
}

impl SendMode {
    /// The `LIRC_MODE_*` value of this mode.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Pulse => LIRC_MODE_PULSE,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pulse => "pulse",
        }
    }
}

impl ReceiveMode {
    /// The `LIRC_MODE_*` value of this mode.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Mode2 => LIRC_MODE_MODE2,
            Self::LircCode => LIRC_MODE_LIRCCODE,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Mode2 => "mode2",
            Self::LircCode => "lirccode",
        }
    }
}

/// Send capabilities this driver understands, in preference order.
pub const SEND_MODES: &[(Features, SendMode)] = &[(Features::CAN_SEND_PULSE, SendMode::Pulse)];

/// Receive capabilities this driver understands, in preference order.
pub const RECEIVE_MODES: &[(Features, ReceiveMode)] = &[
    (Features::CAN_REC_LIRCCODE, ReceiveMode::LircCode),
    (Features::CAN_REC_MODE2, ReceiveMode::Mode2),
];

/// Outcome of matching one direction of a feature mask against its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<M> {
    /// The hardware advertises no capability in this direction.
    Absent,
    /// The hardware advertises a method the table does not list.
    Unsupported,
    Selected(M),
}

impl<M: Copy> Selection<M> {
    pub fn mode(&self) -> Option<M> {
        match self {
            Self::Selected(mode) => Some(*mode),
            _ => None,
        }
    }
}

/// Scan `table` for the first entry whose capability is set in `capabilities`.
pub fn select<M: Copy>(capabilities: Features, table: &[(Features, M)]) -> Selection<M> {
    if capabilities.is_empty() {
        return Selection::Absent;
    }
    table
        .iter()
        .find(|(bit, _)| capabilities.contains(*bit))
        .map_or(Selection::Unsupported, |(_, mode)| Selection::Selected(*mode))
}

/// Mode selection for both directions of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiation {
    pub send: Selection<SendMode>,
    pub receive: Selection<ReceiveMode>,
}

impl Negotiation {
    /// Match the send and receive bits of `features` against the supported tables.
    pub fn from_features(features: Features) -> Self {
        Self {
            send: select(features.send(), SEND_MODES),
            receive: select(features.receive(), RECEIVE_MODES),
        }
    }

    /// Nothing negotiated yet.
    pub const fn none() -> Self {
        Self {
            send: Selection::Absent,
            receive: Selection::Absent,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.send.mode().is_some() || self.receive.mode().is_some()
    }
}

impl Default for Negotiation {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_receive_encoding_is_selected() {
        let mode2 = Negotiation::from_features(Features::CAN_REC_MODE2);
        assert_eq!(mode2.receive, Selection::Selected(ReceiveMode::Mode2));

        let lirccode = Negotiation::from_features(Features::CAN_REC_LIRCCODE);
        assert_eq!(lirccode.receive, Selection::Selected(ReceiveMode::LircCode));
    }

    #[test]
    fn unrecognized_encodings_are_unsupported() {
        let features = Features::CAN_SEND_RAW | Features::CAN_REC_RAW | Features::CAN_REC_PULSE;
        let negotiation = Negotiation::from_features(features);

        assert_eq!(negotiation.send, Selection::Unsupported);
        assert_eq!(negotiation.receive, Selection::Unsupported);
        assert!(!negotiation.is_usable());
    }

    #[test]
    fn missing_direction_is_absent() {
        let negotiation = Negotiation::from_features(Features::CAN_SEND_PULSE);
        assert_eq!(negotiation.send, Selection::Selected(SendMode::Pulse));
        assert_eq!(negotiation.receive, Selection::Absent);
        assert!(negotiation.is_usable());
    }

    #[test]
    fn first_table_entry_wins() {
        let features = Features::CAN_REC_MODE2 | Features::CAN_REC_LIRCCODE;
        let negotiation = Negotiation::from_features(features);
        assert_eq!(negotiation.receive, Selection::Selected(ReceiveMode::LircCode));

        let reversed = [
            (Features::CAN_REC_MODE2, ReceiveMode::Mode2),
            (Features::CAN_REC_LIRCCODE, ReceiveMode::LircCode),
        ];
        assert_eq!(
            select(features.receive(), &reversed),
            Selection::Selected(ReceiveMode::Mode2)
        );
    }

    #[test]
    fn control_bits_do_not_count_as_encodings() {
        let features = Features::CAN_SET_SEND_CARRIER | Features::CAN_GET_REC_RESOLUTION;
        assert_eq!(Negotiation::from_features(features), Negotiation::none());
    }

    #[test]
    fn mode_bits_match_kernel_values() {
        assert_eq!(SendMode::Pulse.bits(), 0x02);
        assert_eq!(ReceiveMode::Mode2.bits(), 0x04);
        assert_eq!(ReceiveMode::LircCode.bits(), 0x10);
    }
}
