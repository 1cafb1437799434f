//! Transport primitives for the remote log client.

use std::{
    io::{self, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

/// Byte-stream connection carrying records to the collector.
///
/// `close` must release the underlying socket; it is called at most once by
/// [`FramedLineWriter`](super::FramedLineWriter).
pub trait Connection: Write + Send {
    fn close(&mut self) -> io::Result<()>;
}

impl Connection for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

fn resolve(addr: &str) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{addr} did not resolve to any address"),
        ));
    }
    Ok(addrs)
}

/// Connect to `addr`, trying each resolved address in turn.
///
/// Every attempt is bounded by `timeout`. The error from the last attempt is
/// returned when none succeed.
pub fn dial(addr: &str, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for candidate in resolve(addr)? {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::TimedOut, format!("unable to connect to {addr}"))
    }))
}
