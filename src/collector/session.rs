//! Per-connection session: read newline-delimited records from one socket
//! and append them to the log file.
//!
//! A session moves through `accepted -> reading -> closing`. Closing lives in
//! `Drop`, so the file is flushed, the socket shut down, and the disconnect
//! event recorded exactly once however reading ends.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, BufWriter, Write},
    net::{Shutdown, SocketAddr, TcpStream},
    path::Path,
};

use log::{info, warn};

use super::{
    deadline::DeadlineReader,
    events::{DisconnectReason, SessionEvent},
};
use crate::{config::CollectorConfig, protocol::RECORD_DELIMITER};

/// Counts appended records and flushes every `flush_interval` of them.
pub(crate) struct FlushTracker {
    writes: usize,
    flush_interval: usize,
}

impl FlushTracker {
    pub(crate) fn new(flush_interval: usize) -> Self {
        Self {
            writes: 0,
            flush_interval,
        }
    }

    pub(crate) fn record_write<W: Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.writes += 1;
        if self.should_flush() {
            writer.flush()?;
        }
        Ok(())
    }

    fn should_flush(&self) -> bool {
        self.flush_interval != 0 && self.writes > 0 && self.writes % self.flush_interval == 0
    }
}

pub(crate) fn open_log_file(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path)
}

fn notify(config: &CollectorConfig, event: SessionEvent) {
    if let Some(events) = &config.events {
        if events.try_send(event).is_err() {
            log::debug!("log collector: session event observer unavailable");
        }
    }
}

struct Session<'a> {
    peer: SocketAddr,
    reader: BufReader<DeadlineReader<TcpStream>>,
    writer: Option<BufWriter<File>>,
    tracker: FlushTracker,
    reason: DisconnectReason,
    records: u64,
    bytes: u64,
    config: &'a CollectorConfig,
}

impl<'a> Session<'a> {
    fn accept(stream: TcpStream, peer: SocketAddr, config: &'a CollectorConfig) -> Self {
        let reader = BufReader::new(DeadlineReader::new(stream, config.idle_timeout));
        let (writer, reason) = match open_log_file(&config.log_path, config.file_mode) {
            Ok(file) => (Some(BufWriter::new(file)), DisconnectReason::Eof),
            Err(err) => {
                warn!(
                    "log collector: error opening {}: {err}",
                    config.log_path.display()
                );
                (None, DisconnectReason::FileOpen(err.kind()))
            }
        };
        Self {
            peer,
            reader,
            writer,
            tracker: FlushTracker::new(config.flush_interval),
            reason,
            records: 0,
            bytes: 0,
            config,
        }
    }

    fn append(&mut self, record: &[u8]) -> io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        writer.write_all(record)?;
        self.records += 1;
        self.bytes += record.len() as u64;
        self.tracker.record_write(writer)
    }

    /// Copy records until the stream ends or fails. Bytes returned ahead of
    /// a read error are still appended.
    fn pump(&mut self) {
        if self.writer.is_none() {
            return;
        }
        let mut record = Vec::new();
        loop {
            record.clear();
            let result = self.reader.read_until(RECORD_DELIMITER, &mut record);
            if !record.is_empty() {
                if let Err(err) = self.append(&record) {
                    warn!("log collector: error writing record from {}: {err}", self.peer);
                    self.reason = DisconnectReason::FileWrite(err.kind());
                    return;
                }
            }
            match result {
                Ok(0) => {
                    self.reason = DisconnectReason::Eof;
                    return;
                }
                Ok(_) => {}
                Err(err) => {
                    self.reason = DisconnectReason::from_read_error(&err);
                    return;
                }
            }
        }
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.flush() {
                warn!("log collector: error flushing records from {}: {err}", self.peer);
            }
        }
        let _ = self.reader.get_ref().get_ref().shutdown(Shutdown::Both);
        if self.reason.is_clean() {
            info!("{} disconnected ({} records)", self.peer, self.records);
        } else {
            warn!(
                "{} disconnected: {} ({} records)",
                self.peer, self.reason, self.records
            );
        }
        notify(
            self.config,
            SessionEvent::Disconnected {
                peer: self.peer,
                reason: self.reason,
                records: self.records,
                bytes: self.bytes,
            },
        );
    }
}

/// Serve one accepted connection to completion.
pub(crate) fn run_session(stream: TcpStream, peer: SocketAddr, config: &CollectorConfig) {
    info!("{peer} connected");
    notify(config, SessionEvent::Connected { peer });
    let mut session = Session::accept(stream, peer, config);
    session.pump();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[derive(Default)]
    struct CountingWriter {
        flushed: usize,
    }

    impl Write for CountingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed += 1;
            Ok(())
        }
    }

    #[rstest]
    #[case(1, 3, 3)]
    #[case(2, 5, 2)]
    #[case(0, 4, 0)]
    fn flush_tracker_flushes_on_interval(
        #[case] interval: usize,
        #[case] writes: usize,
        #[case] expected_flushes: usize,
    ) {
        let mut tracker = FlushTracker::new(interval);
        let mut writer = CountingWriter::default();
        for _ in 0..writes {
            tracker.record_write(&mut writer).unwrap();
        }
        assert_eq!(writer.flushed, expected_flushes);
    }

    #[cfg(unix)]
    #[rstest]
    fn new_log_file_uses_configured_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        drop(open_log_file(&path, 0o600).unwrap());
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[rstest]
    fn open_log_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        open_log_file(&path, 0o644).unwrap().write_all(b"one\n").unwrap();
        open_log_file(&path, 0o644).unwrap().write_all(b"two\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"one\ntwo\n");
    }
}
