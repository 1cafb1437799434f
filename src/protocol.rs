//! Wire and persistence constants shared by the client and the collector.
//!
//! The protocol is plain newline-delimited text over TCP. There is no
//! handshake and no acknowledgement; a record is every byte up to and
//! including the next [`RECORD_DELIMITER`].

use std::time::Duration;

/// Default collector address used by both sides.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8081";
/// Byte terminating every record on the wire and in the log file.
pub const RECORD_DELIMITER: u8 = b'\n';
/// Upper bound on establishing the client connection.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);
/// Socket write timeout applied by the client.
///
/// Matches [`SHUTDOWN_BUDGET`] so a flush during close cannot outlive the
/// host's shutdown window.
pub const DEFAULT_WRITE_TIMEOUT: Duration = SHUTDOWN_BUDGET;
/// Absolute idle deadline for a collector session, measured from accept.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
/// File the collector appends records to, relative to its working directory.
pub const DEFAULT_LOG_FILE: &str = "app.log";
/// Permission bits used when the collector creates the log file.
pub const DEFAULT_FILE_MODE: u32 = 0o644;
/// Time a host process is expected to allow for closing its logger.
pub const SHUTDOWN_BUDGET: Duration = Duration::from_secs(5);
/// `chrono` format string for the record timestamp (UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    #[test]
    fn default_addr_is_loopback_8081() {
        let addr: SocketAddr = DEFAULT_ADDR.parse().expect("valid socket address");
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8081);
    }
}
