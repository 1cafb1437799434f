//! Fan-out of one record to an ordered set of sinks.
//!
//! `TeeWriter` forwards every write to each sink in registration order. A
//! failing sink never prevents later sinks from receiving the bytes; the
//! first error is reported once every sink has been attempted.

use std::io::{self, Write};

use log::debug;

/// Destination for formatted records.
///
/// `close` releases the destination. The default implementation only
/// flushes, which suits process-wide streams such as stdout.
pub trait Sink: Write + Send {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for io::Stdout {}
impl Sink for io::Stderr {}
impl Sink for Vec<u8> {}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

#[derive(Default)]
pub struct TeeWriter {
    sinks: Vec<Box<dyn Sink>>,
    closed: bool,
}

impl TeeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sink; it receives records after every sink added before it.
    pub fn push(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    pub fn with_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Write `line` in full to every sink and flush each one.
    pub fn write_record(&mut self, line: &[u8]) -> io::Result<()> {
        let mut first_err = None;
        for (index, sink) in self.sinks.iter_mut().enumerate() {
            if let Err(err) = sink.write_all(line).and_then(|()| sink.flush()) {
                debug!("TeeWriter: sink {index} rejected record: {err}");
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Close every sink in order, returning the last error encountered.
    ///
    /// A second call returns [`io::ErrorKind::NotConnected`] without
    /// touching the sinks.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "log writer already closed",
            ));
        }
        self.closed = true;
        let mut result = Ok(());
        for sink in &mut self.sinks {
            if let Err(err) = sink.close() {
                result = Err(err);
            }
        }
        result
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_record(buf).map(|()| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(err) = sink.flush() {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for TeeWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeeWriter")
            .field("sinks", &self.sinks.len())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recording {
        bytes: Arc<Mutex<Vec<u8>>>,
        closes: Arc<Mutex<usize>>,
    }

    impl Write for Recording {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink for Recording {
        fn close(&mut self) -> io::Result<()> {
            *self.closes.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct Broken(io::ErrorKind);

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(self.0, "broken sink"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink for Broken {
        fn close(&mut self) -> io::Result<()> {
            Err(io::Error::new(self.0, "broken close"))
        }
    }

    #[rstest]
    fn every_sink_receives_record_in_order() {
        let first = Recording::default();
        let second = Recording::default();
        let mut tee = TeeWriter::new()
            .with_sink(first.clone())
            .with_sink(second.clone());
        assert_eq!(tee.len(), 2);
        tee.write_record(b"INFO: hello\n").unwrap();
        assert_eq!(*first.bytes.lock().unwrap(), b"INFO: hello\n");
        assert_eq!(*second.bytes.lock().unwrap(), b"INFO: hello\n");
    }

    #[rstest]
    #[case::failing_first(true)]
    #[case::failing_last(false)]
    fn failing_sink_does_not_starve_others(#[case] failing_first: bool) {
        let healthy = Recording::default();
        let mut tee = TeeWriter::new();
        if failing_first {
            tee = tee
                .with_sink(Broken(io::ErrorKind::BrokenPipe))
                .with_sink(healthy.clone());
        } else {
            tee = tee
                .with_sink(healthy.clone())
                .with_sink(Broken(io::ErrorKind::BrokenPipe));
        }
        let err = tee.write_record(b"ERROR: oops\n").expect_err("one sink fails");
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(*healthy.bytes.lock().unwrap(), b"ERROR: oops\n");
    }

    #[rstest]
    fn first_error_wins_when_several_sinks_fail() {
        let mut tee = TeeWriter::new()
            .with_sink(Broken(io::ErrorKind::BrokenPipe))
            .with_sink(Broken(io::ErrorKind::ConnectionReset));
        let err = tee.write_record(b"x\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[rstest]
    fn close_visits_every_sink_and_reports_last_error() {
        let healthy = Recording::default();
        let mut tee = TeeWriter::new()
            .with_sink(Broken(io::ErrorKind::BrokenPipe))
            .with_sink(healthy.clone())
            .with_sink(Broken(io::ErrorKind::ConnectionReset));
        let err = tee.close().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(*healthy.closes.lock().unwrap(), 1);
    }

    #[rstest]
    fn second_close_is_rejected() {
        let healthy = Recording::default();
        let mut tee = TeeWriter::new().with_sink(healthy.clone());
        tee.close().unwrap();
        let err = tee.close().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert_eq!(*healthy.closes.lock().unwrap(), 1);
    }

    #[rstest]
    fn empty_tee_accepts_writes() {
        let mut tee = TeeWriter::new();
        assert!(tee.is_empty());
        assert_eq!(tee.write(b"nowhere\n").unwrap(), 8);
    }
}
