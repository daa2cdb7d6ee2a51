//! IR device endpoint access.
//!
//! Provides a unified interface over the endpoint kinds an IR device can be
//! exposed through:
//! - LIRC character devices (`/dev/lirc0`)
//! - Named pipes (pre-recorded or externally produced mode2 streams)
//! - Unix stream sockets (userspace IR daemons)
//!
//! This is the lowest layer of irdev. The driver builds on the [`IrStream`]
//! handle returned by [`Endpoint::open`].

#![cfg(unix)]

pub mod endpoint;
pub mod error;
pub mod stream;

pub use endpoint::{Endpoint, EndpointKind};
pub use error::{Result, TransportError};
pub use stream::IrStream;
