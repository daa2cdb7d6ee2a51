use std::path::PathBuf;

/// Errors that can occur while opening or driving an IR endpoint.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not get file information for the endpoint path.
    #[error("could not get file information for {path}: {source}")]
    Stat {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to open the endpoint for reading and writing.
    #[error("could not open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to a unix socket endpoint.
    #[error("could not connect to unix socket {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the endpoint.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
