//! Reader enforcing one absolute deadline across many reads.
//!
//! Sockets only offer a per-read timeout, so every read re-arms the timeout
//! with whatever remains until the deadline.

use std::{
    io::{self, Read},
    net::TcpStream,
    time::{Duration, Instant},
};

/// Source that supports a per-read timeout.
pub trait TimedRead: Read {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

impl TimedRead for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}

pub struct DeadlineReader<R> {
    inner: R,
    deadline: Instant,
}

impl<R: TimedRead> DeadlineReader<R> {
    /// Wrap `inner` so reads fail once `window` has elapsed from now.
    ///
    /// A window too large to represent is treated as no deadline at all.
    pub fn new(inner: R, window: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(window)
            .unwrap_or_else(|| now + Duration::from_secs(u32::MAX.into()));
        Self { inner, deadline }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

impl<R: TimedRead> Read for DeadlineReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "session deadline elapsed",
            ));
        }
        self.inner.set_read_timeout(Some(remaining))?;
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Source that records the timeouts it was armed with.
    struct Scripted {
        data: io::Cursor<Vec<u8>>,
        armed: RefCell<Vec<Duration>>,
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.data.read(buf)
        }
    }

    impl TimedRead for Scripted {
        fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
            self.armed.borrow_mut().extend(timeout);
            Ok(())
        }
    }

    fn scripted(bytes: &[u8]) -> Scripted {
        Scripted {
            data: io::Cursor::new(bytes.to_vec()),
            armed: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn rearms_with_shrinking_remainder() {
        let mut reader = DeadlineReader::new(scripted(b"abcdef"), Duration::from_secs(60));
        let mut buf = [0u8; 3];
        reader.read_exact(&mut buf).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        reader.read_exact(&mut buf).unwrap();

        let armed = reader.get_ref().armed.borrow().clone();
        assert_eq!(armed.len(), 2);
        assert!(armed[0] <= Duration::from_secs(60));
        assert!(armed[1] < armed[0], "second timeout must be shorter");
    }

    #[test]
    fn fails_once_deadline_passed() {
        let mut reader = DeadlineReader::new(scripted(b"late"), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        let err = reader.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn huge_window_does_not_overflow() {
        let reader = DeadlineReader::new(scripted(b""), Duration::MAX);
        assert!(reader.remaining() > Duration::from_secs(60 * 60));
    }
}
