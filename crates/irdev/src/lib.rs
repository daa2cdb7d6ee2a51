//! LIRC infrared device access.
//!
//! irdev opens an IR endpoint (LIRC character device, FIFO, or unix socket),
//! negotiates what it can send and receive, and moves pulse data both ways.
//!
//! # Crate Structure
//!
//! - [`transport`]: endpoint classification and raw device I/O
//! - [`driver`]: capability negotiation, transmit and receive paths

/// Re-export transport types.
pub mod transport {
    pub use irdev_transport::*;
}

/// Re-export driver types.
pub mod driver {
    pub use irdev_driver::*;
}
