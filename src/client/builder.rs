//! Builder for [`RemoteLogger`].
//!
//! Exposes the collector address and timeouts along with seams for the local
//! sink, the clock, and the formatter. The local sink defaults to stdout.

use std::{io, sync::Arc, time::Duration};

use super::{FramedLineWriter, LoggerError, RemoteLogger, transport};
use crate::{
    clock::{Clock, SystemClock},
    config::ClientConfig,
    formatter::{LineFormatter, SharedFormatter},
    tee::{Sink, TeeWriter},
};

pub struct LoggerBuilder {
    remote: bool,
    config: ClientConfig,
    local: Option<Box<dyn Sink>>,
    clock: Option<Arc<dyn Clock>>,
    formatter: Option<SharedFormatter>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            remote: true,
            config: ClientConfig::default(),
            local: None,
            clock: None,
            formatter: None,
        }
    }
}

impl LoggerBuilder {
    /// Builder targeting the default collector address.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ship records to the collector (`true`) or only to the local sink.
    pub fn with_remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.config.dial_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    /// Replace stdout as the local mirror of every record.
    pub fn with_local_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.local = Some(Box::new(sink));
        self
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn with_formatter<F: LineFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(SharedFormatter::new(formatter));
        self
    }

    /// Dial the collector (when remote) and assemble the logger.
    ///
    /// The local sink is registered first so its output never depends on
    /// the health of the remote connection.
    pub fn build(self) -> Result<RemoteLogger, LoggerError> {
        let mut sinks = TeeWriter::new();
        sinks.push(self.local.unwrap_or_else(|| Box::new(io::stdout())));

        let mut remote_addr = None;
        if self.remote {
            self.config.validate().map_err(LoggerError::InvalidConfig)?;
            let stream = transport::dial(&self.config.addr, self.config.dial_timeout).map_err(
                |source| LoggerError::Connect {
                    addr: self.config.addr.clone(),
                    source,
                },
            )?;
            stream
                .set_write_timeout(self.config.write_timeout)
                .map_err(LoggerError::Socket)?;
            remote_addr = stream.peer_addr().ok();
            sinks.push(Box::new(FramedLineWriter::new(stream)));
        }

        Ok(RemoteLogger::from_parts(
            sinks,
            self.formatter.unwrap_or_default(),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            remote_addr,
        ))
    }
}

impl std::fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("remote", &self.remote)
            .field("config", &self.config)
            .field("custom_local_sink", &self.local.is_some())
            .finish()
    }
}
