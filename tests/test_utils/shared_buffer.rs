//! Shared buffer used as the local sink of loggers under test.
//!
//! Loggers take ownership of their sink, so tests keep a clone of the
//! `SharedBuf` to inspect what was mirrored locally.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use linecast::Sink;

/// Thread-safe wrapper around a byte buffer.
///
/// The inner `Arc<Mutex<Vec<u8>>>` is kept private so tests can't
/// accidentally bypass the `Write` implementation or mutate the buffer
/// without locking.
#[derive(Clone, Default)]
pub struct SharedBuf {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    /// Return the buffer contents as UTF-8 text.
    #[allow(dead_code)]
    pub fn text(&self) -> String {
        String::from_utf8(
            self.buffer
                .lock()
                .expect("SharedBuf mutex poisoned")
                .clone(),
        )
        .expect("Buffer contains invalid UTF-8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .expect("SharedBuf mutex poisoned")
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for SharedBuf {}
