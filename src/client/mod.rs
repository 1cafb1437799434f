//! Remote log client.
//!
//! `RemoteLogger` formats timestamped records and tees each one to a local
//! sink (stdout unless overridden) and, when remote delivery is enabled, to a
//! [`FramedLineWriter`] over a TCP connection to the collector. The connection
//! is dialled once at construction; there is no reconnect. After a network
//! failure the remote channel stays broken and keeps reporting errors while
//! the local sink continues to receive every record.
//!
//! The host process owns one logger, passes it to the components that log,
//! and calls [`RemoteLogger::close`] during shutdown.
//!
//! Remote delivery failures are reported through the `log` facade only. A
//! host that wants them on stderr must call
//! [`log_compat::install`](crate::log_compat::install) or install its own
//! `log` backend; without one they are silently discarded.

mod builder;
mod framed_writer;
mod transport;

use std::{fmt, io, net::SocketAddr, sync::Arc};

use log::debug;
use parking_lot::Mutex;
use thiserror::Error;

use crate::{
    clock::Clock, formatter::SharedFormatter, level::LogLevel, log_record::LogRecord,
    tee::TeeWriter,
};

pub use builder::LoggerBuilder;
pub use framed_writer::{DEFAULT_BUFFER_CAPACITY, FramedLineWriter};
pub use transport::{Connection, dial};

/// Errors surfaced by [`RemoteLogger`] construction and shutdown.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid logger configuration: {0}")]
    InvalidConfig(String),
    #[error("error connecting to remote log server at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("error configuring remote log connection: {0}")]
    Socket(#[source] io::Error),
    #[error("closing log writer: {0}")]
    Close(#[source] io::Error),
}

pub struct RemoteLogger {
    sinks: Mutex<TeeWriter>,
    formatter: SharedFormatter,
    clock: Arc<dyn Clock>,
    remote_addr: Option<SocketAddr>,
}

impl RemoteLogger {
    /// Create a logger mirroring records to stdout and, when `remote` is
    /// true, to the collector at the default address.
    ///
    /// Dialling is bounded by the default 5 second timeout; an unreachable
    /// collector yields [`LoggerError::Connect`].
    pub fn new(remote: bool) -> Result<Self, LoggerError> {
        LoggerBuilder::new().with_remote(remote).build()
    }

    /// Create a remote logger from explicit client settings.
    pub fn from_config(config: crate::config::ClientConfig) -> Result<Self, LoggerError> {
        LoggerBuilder::new().with_config(config).build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub(crate) fn from_parts(
        sinks: TeeWriter,
        formatter: SharedFormatter,
        clock: Arc<dyn Clock>,
        remote_addr: Option<SocketAddr>,
    ) -> Self {
        Self {
            sinks: Mutex::new(sinks),
            formatter,
            clock,
            remote_addr,
        }
    }

    /// Collector address when remote delivery is enabled.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn is_remote(&self) -> bool {
        self.remote_addr.is_some()
    }

    /// Log at `INFO`. Prefer the [`linecast_info!`](crate::linecast_info) macro.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    /// Log at `ERROR`. Prefer the [`linecast_error!`](crate::linecast_error) macro.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    /// Format one record and hand the complete line to every sink.
    ///
    /// Sink failures are logged through the `log` facade, never returned, so
    /// they only become visible once a `log` backend is installed.
    pub fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        let record = LogRecord::from_args(level, self.clock.now(), args);
        let line = self.formatter.format_line(&record);
        if let Err(err) = self.sinks.lock().write_record(&line) {
            debug!("RemoteLogger: record not delivered to every sink: {err}");
        }
    }

    /// Flush and close the remote connection.
    ///
    /// A second call fails with [`LoggerError::Close`] whose source has kind
    /// [`io::ErrorKind::NotConnected`].
    pub fn close(&self) -> Result<(), LoggerError> {
        self.sinks.lock().close().map_err(LoggerError::Close)
    }
}

impl fmt::Debug for RemoteLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteLogger")
            .field("remote_addr", &self.remote_addr)
            .field("sinks", &*self.sinks.lock())
            .finish()
    }
}

/// Log at `INFO` through a [`RemoteLogger`] using `format!` syntax.
///
/// ```rust,ignore
/// linecast_info!(logger, "user {} logged in", user);
/// ```
#[macro_export]
macro_rules! linecast_info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
}

/// Log at `ERROR` through a [`RemoteLogger`] using `format!` syntax.
///
/// ```rust,ignore
/// linecast_error!(logger, "error starting server: {}", err);
/// ```
#[macro_export]
macro_rules! linecast_error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
}
