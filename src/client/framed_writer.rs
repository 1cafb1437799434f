//! Buffered writer that pushes every logical write onto the connection
//! before returning.
//!
//! The buffer exists so a record reaches the socket through `write_all`
//! rather than a partial-write loop at the call site; it never holds bytes
//! across calls while the connection is healthy. Failures are reported
//! through the `log` facade and handed back to the caller. The writer never
//! retries within a call and never closes the connection on its own after an
//! error.
//!
//! When a flush fails, `BufWriter` keeps the bytes the socket did not accept
//! and sends them ahead of the next record. A record cut short by the write
//! timeout is therefore completed before anything else goes out, so the
//! collector never sees two records spliced together.

use std::io::{self, BufWriter, Write};

use log::warn;

use super::transport::Connection;
use crate::tee::Sink;

/// Default size of the intermediate buffer in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

fn already_closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "connection already closed")
}

pub struct FramedLineWriter<C: Connection> {
    inner: Option<BufWriter<C>>,
}

impl<C: Connection> FramedLineWriter<C> {
    pub fn new(conn: C) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, conn)
    }

    pub fn with_capacity(capacity: usize, conn: C) -> Self {
        Self {
            inner: Some(BufWriter::with_capacity(capacity, conn)),
        }
    }

    /// Whether [`close`](Self::close) has already run.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Borrow the connection while the writer is open.
    pub fn get_ref(&self) -> Option<&C> {
        self.inner.as_ref().map(BufWriter::get_ref)
    }

    /// Flush residual bytes, then close the connection.
    ///
    /// The connection is closed even when the flush fails. Both failures are
    /// logged and the last one encountered is returned. Calling `close` again
    /// yields an [`io::ErrorKind::NotConnected`] error.
    pub fn close(&mut self) -> io::Result<()> {
        let Some(mut writer) = self.inner.take() else {
            return Err(already_closed());
        };
        let mut result = Ok(());
        if let Err(err) = writer.flush() {
            warn!("FramedLineWriter: error flushing to connection: {err}");
            result = Err(err);
        }
        let (mut conn, _unflushed) = writer.into_parts();
        if let Err(err) = conn.close() {
            warn!("FramedLineWriter: error closing connection: {err}");
            result = Err(err);
        }
        result
    }
}

impl<C: Connection> Write for FramedLineWriter<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let writer = self.inner.as_mut().ok_or_else(already_closed)?;
        if let Err(err) = writer.write_all(buf) {
            warn!("FramedLineWriter: error writing to connection: {err}");
            return Err(err);
        }
        if let Err(err) = writer.flush() {
            warn!("FramedLineWriter: error flushing to connection: {err}");
            return Err(err);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.as_mut().ok_or_else(already_closed)?.flush()
    }
}

impl<C: Connection> Sink for FramedLineWriter<C> {
    fn close(&mut self) -> io::Result<()> {
        FramedLineWriter::close(self)
    }
}

impl<C: Connection> Drop for FramedLineWriter<C> {
    fn drop(&mut self) {
        if !self.is_closed() {
            let _ = self.close();
        }
    }
}

impl<C: Connection> std::fmt::Debug for FramedLineWriter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedLineWriter")
            .field("closed", &self.is_closed())
            .finish()
    }
}
