//! Lifecycle events emitted by collector sessions.

use std::{fmt, io, net::SocketAddr};

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The peer closed its side of the stream.
    Eof,
    /// The session deadline elapsed before the peer finished.
    IdleTimeout,
    /// Reading from the socket failed.
    ReadError(io::ErrorKind),
    /// The log file could not be opened.
    FileOpen(io::ErrorKind),
    /// Appending to the log file failed.
    FileWrite(io::ErrorKind),
}

impl DisconnectReason {
    /// A graceful close by the peer, as opposed to any kind of failure.
    pub fn is_clean(self) -> bool {
        matches!(self, DisconnectReason::Eof)
    }

    pub(crate) fn from_read_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => DisconnectReason::IdleTimeout,
            kind => DisconnectReason::ReadError(kind),
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::Eof => f.write_str("end of stream"),
            DisconnectReason::IdleTimeout => f.write_str("idle timeout"),
            DisconnectReason::ReadError(kind) => write!(f, "read error ({kind})"),
            DisconnectReason::FileOpen(kind) => write!(f, "log file open failed ({kind})"),
            DisconnectReason::FileWrite(kind) => write!(f, "log file write failed ({kind})"),
        }
    }
}

/// Observable session transitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Connected {
        peer: SocketAddr,
    },
    Disconnected {
        peer: SocketAddr,
        reason: DisconnectReason,
        /// Records appended to the log file, a trailing partial one included.
        records: u64,
        /// Bytes appended to the log file.
        bytes: u64,
    },
}

impl SessionEvent {
    pub fn peer(&self) -> SocketAddr {
        match self {
            SessionEvent::Connected { peer } | SessionEvent::Disconnected { peer, .. } => *peer,
        }
    }
}
