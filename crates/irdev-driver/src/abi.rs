//! LIRC character-device ABI: feature bits and control request codes.
//!
//! Values follow `linux/lirc.h`. Request codes use the generic Linux
//! `_IOC` layout (x86, arm, riscv); every request used here carries a
//! `__u32` argument.

use std::fmt;

use bitflags::bitflags;

const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;
const LIRC_IOC_TYPE: u8 = b'i';
const U32_SIZE: u32 = std::mem::size_of::<u32>() as u32;

const fn ioc(dir: u32, nr: u8) -> u32 {
    (dir << 30) | (U32_SIZE << 16) | ((LIRC_IOC_TYPE as u32) << 8) | nr as u32
}

/// `_IOR('i', 0x00, __u32)`
pub const LIRC_GET_FEATURES: u32 = ioc(IOC_READ, 0x00);
/// `_IOR('i', 0x07, __u32)`, microseconds.
pub const LIRC_GET_REC_RESOLUTION: u32 = ioc(IOC_READ, 0x07);
/// `_IOR('i', 0x0f, __u32)`, lirccode bit length.
pub const LIRC_GET_LENGTH: u32 = ioc(IOC_READ, 0x0f);
/// `_IOW('i', 0x13, __u32)`, Hz.
pub const LIRC_SET_SEND_CARRIER: u32 = ioc(IOC_WRITE, 0x13);
/// `_IOW('i', 0x15, __u32)`, percent.
pub const LIRC_SET_SEND_DUTY_CYCLE: u32 = ioc(IOC_WRITE, 0x15);

pub const LIRC_MODE_RAW: u32 = 0x0000_0001;
pub const LIRC_MODE_PULSE: u32 = 0x0000_0002;
pub const LIRC_MODE_MODE2: u32 = 0x0000_0004;
pub const LIRC_MODE_LIRCCODE: u32 = 0x0000_0010;

bitflags! {
    /// Hardware capability bitmask reported by `LIRC_GET_FEATURES`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u32 {
        const CAN_SEND_RAW = LIRC_MODE_RAW;
        const CAN_SEND_PULSE = LIRC_MODE_PULSE;
        const CAN_SEND_MODE2 = LIRC_MODE_MODE2;
        const CAN_SEND_LIRCCODE = LIRC_MODE_LIRCCODE;

        const CAN_SET_SEND_CARRIER = 0x0000_0100;
        const CAN_SET_SEND_DUTY_CYCLE = 0x0000_0200;
        const CAN_SET_TRANSMITTER_MASK = 0x0000_0400;

        const CAN_REC_RAW = LIRC_MODE_RAW << 16;
        const CAN_REC_PULSE = LIRC_MODE_PULSE << 16;
        const CAN_REC_MODE2 = LIRC_MODE_MODE2 << 16;
        const CAN_REC_LIRCCODE = LIRC_MODE_LIRCCODE << 16;

        const CAN_SET_REC_CARRIER = 0x0100_0000;
        const CAN_MEASURE_CARRIER = 0x0200_0000;
        const CAN_USE_WIDEBAND_RECEIVER = 0x0400_0000;
        const CAN_SET_REC_TIMEOUT = 0x1000_0000;
        const CAN_GET_REC_RESOLUTION = 0x2000_0000;
        const CAN_SET_REC_CARRIER_RANGE = 0x8000_0000;
    }
}

impl Features {
    /// `LIRC_CAN_SEND_MASK`
    pub const SEND_MASK: Self = Self::from_bits_retain(0x0000_003f);
    /// `LIRC_CAN_REC_MASK`
    pub const REC_MASK: Self = Self::from_bits_retain(0x003f_0000);

    /// The send capability bits.
    pub fn send(self) -> Self {
        self & Self::SEND_MASK
    }

    /// The receive capability bits.
    pub fn receive(self) -> Self {
        self & Self::REC_MASK
    }

    pub fn can_send(self) -> bool {
        !self.send().is_empty()
    }

    pub fn can_receive(self) -> bool {
        !self.receive().is_empty()
    }

    /// Names of the known capability bits that are set.
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.bits())
    }
}
