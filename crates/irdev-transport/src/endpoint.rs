use std::fs::OpenOptions;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::IrStream;

/// Maximum socket path length.
/// Unix `sockaddr_un.sun_path` is typically 108 bytes on Linux, 104 on macOS.
#[cfg(target_os = "linux")]
const MAX_SOCKET_PATH_LEN: usize = 108;
#[cfg(not(target_os = "linux"))]
const MAX_SOCKET_PATH_LEN: usize = 104;

/// What kind of filesystem object an endpoint path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// A unix stream socket served by a userspace IR daemon.
    Socket,
    /// A named pipe carrying mode2 samples.
    Fifo,
    /// A character-special device, normally a LIRC device node.
    CharDevice { major: u32, minor: u32 },
    /// Anything else (regular files, directories, block devices).
    Other,
}

impl EndpointKind {
    /// Classify `path` with `stat(2)`, following symlinks.
    pub fn classify(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| TransportError::Stat {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file_type = metadata.file_type();
        let kind = if file_type.is_socket() {
            Self::Socket
        } else if file_type.is_fifo() {
            Self::Fifo
        } else if file_type.is_char_device() {
            let rdev = metadata.rdev() as libc::dev_t;
            Self::CharDevice {
                major: libc::major(rdev) as u32,
                minor: libc::minor(rdev) as u32,
            }
        } else {
            Self::Other
        };
        Ok(kind)
    }

    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Socket => "unix-socket",
            Self::Fifo => "fifo",
            Self::CharDevice { .. } => "char-device",
            Self::Other => "other",
        }
    }
}

/// An opened IR endpoint: the classified kind plus a connected stream.
#[derive(Debug)]
pub struct Endpoint {
    path: PathBuf,
    kind: EndpointKind,
    stream: IrStream,
}

impl Endpoint {
    /// Classify `path` and open it.
    ///
    /// Sockets are connected as stream sockets. Every other kind is opened
    /// read+write, including kinds the caller will reject afterwards; the
    /// handle is closed when the returned value is dropped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let kind = EndpointKind::classify(path)?;

        let stream = match kind {
            EndpointKind::Socket => {
                let stream = connect_unix(path)?;
                debug!(?path, "using unix socket lirc device");
                IrStream::from_unix(stream)
            }
            _ => {
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open(path)
                    .map_err(|e| TransportError::Open {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                debug!(?path, kind = kind.name(), "opened device");
                IrStream::from_file(file)
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            kind,
            stream,
        })
    }

    /// The path this endpoint was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    /// Borrow the underlying stream.
    pub fn stream(&self) -> &IrStream {
        &self.stream
    }

    /// Consume the endpoint, returning its kind and stream.
    pub fn into_parts(self) -> (EndpointKind, IrStream) {
        (self.kind, self.stream)
    }
}

fn connect_unix(path: &Path) -> Result<UnixStream> {
    let path_bytes = path.as_os_str().len();
    if path_bytes >= MAX_SOCKET_PATH_LEN {
        return Err(TransportError::PathTooLong {
            path: path.to_path_buf(),
            len: path_bytes,
            max: MAX_SOCKET_PATH_LEN,
        });
    }

    UnixStream::connect(path).map_err(|e| TransportError::Connect {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::io::{Read, Write};
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::net::UnixListener;

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "irdev-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    fn mkfifo(path: &Path) {
        let c_path = CString::new(path.as_os_str().as_bytes()).expect("path has no NUL");
        // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
        let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) };
        assert_eq!(rc, 0, "mkfifo should succeed");
    }

    #[test]
    fn classifies_fifo() {
        let dir = unique_temp_dir("classify-fifo");
        let fifo = dir.join("ir.fifo");
        mkfifo(&fifo);

        assert_eq!(EndpointKind::classify(&fifo).unwrap(), EndpointKind::Fifo);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn classifies_regular_file_as_other() {
        let dir = unique_temp_dir("classify-file");
        let file = dir.join("plain");
        std::fs::write(&file, b"not a device").unwrap();

        assert_eq!(EndpointKind::classify(&file).unwrap(), EndpointKind::Other);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn classifies_dev_null_as_char_device() {
        let kind = EndpointKind::classify("/dev/null").unwrap();
        assert!(matches!(kind, EndpointKind::CharDevice { major: 1, minor: 3 }));
    }

    #[test]
    fn classify_missing_path_is_stat_error() {
        let result = EndpointKind::classify("/nonexistent/irdev/lirc0");
        assert!(matches!(result, Err(TransportError::Stat { .. })));
    }

    #[test]
    fn open_connects_to_socket() {
        let dir = unique_temp_dir("open-sock");
        let sock_path = dir.join("ir.sock");
        let listener = UnixListener::bind(&sock_path).unwrap();

        let endpoint = Endpoint::open(&sock_path).unwrap();
        assert_eq!(endpoint.kind(), EndpointKind::Socket);

        let (mut server, _) = listener.accept().unwrap();
        let (_, mut stream) = endpoint.into_parts();
        stream.write_all(&[1, 2, 3, 4]).unwrap();
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_fifo_read_write_does_not_block() {
        let dir = unique_temp_dir("open-fifo");
        let fifo = dir.join("ir.fifo");
        mkfifo(&fifo);

        let endpoint = Endpoint::open(&fifo).unwrap();
        assert_eq!(endpoint.kind(), EndpointKind::Fifo);
        assert_eq!(endpoint.path(), fifo.as_path());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_socket_without_listener_is_connect_error() {
        let dir = unique_temp_dir("stale-sock");
        let sock_path = dir.join("stale.sock");
        drop(UnixListener::bind(&sock_path).unwrap());

        let result = Endpoint::open(&sock_path);
        assert!(matches!(result, Err(TransportError::Connect { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn connect_rejects_long_path() {
        let long_path = PathBuf::from("/tmp/".to_string() + &"a".repeat(200) + ".sock");
        let result = connect_unix(&long_path);
        assert!(matches!(result, Err(TransportError::PathTooLong { .. })));
    }
}
