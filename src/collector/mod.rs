//! TCP log collector.
//!
//! `LogCollector` binds a listener and runs a dedicated accept loop. Every
//! accepted connection gets its own thread running an isolated session that
//! appends newline-delimited records to the configured log file. The number
//! of concurrent sessions is not bounded, and sessions share nothing except
//! the file, which each of them opens independently in append mode.
//!
//! There is no graceful shutdown: the accept loop runs until the process is
//! terminated or the listener fails irrecoverably.

mod deadline;
mod events;
mod session;

use std::{
    io,
    net::{SocketAddr, TcpListener, TcpStream},
    sync::Arc,
    thread,
};

use log::{info, warn};
use thiserror::Error;

use crate::config::CollectorConfig;

pub use deadline::{DeadlineReader, TimedRead};
pub use events::{DisconnectReason, SessionEvent};

/// Errors that stop the collector.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("invalid collector configuration: {0}")]
    InvalidConfig(String),
    #[error("error starting tcp listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("error accepting connection: {0}")]
    Accept(#[source] io::Error),
}

/// Collector that has not bound its listener yet.
#[derive(Clone, Debug, Default)]
pub struct LogCollector {
    config: CollectorConfig,
}

impl LogCollector {
    /// Collector listening on `addr` with every other setting at its default.
    pub fn new(addr: impl Into<String>) -> Self {
        Self::with_config(CollectorConfig::default().with_addr(addr))
    }

    pub fn with_config(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Bind the listen socket.
    pub fn bind(self) -> Result<ListeningCollector, CollectorError> {
        self.config
            .validate()
            .map_err(CollectorError::InvalidConfig)?;
        let listener =
            TcpListener::bind(self.config.addr.as_str()).map_err(|source| CollectorError::Bind {
                addr: self.config.addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| CollectorError::Bind {
                addr: self.config.addr.clone(),
                source,
            })?;
        info!("log server listening on {local_addr}");
        Ok(ListeningCollector {
            listener,
            local_addr,
            config: Arc::new(self.config),
        })
    }

    /// Bind and serve; blocks for the life of the collector.
    pub fn run(self) -> Result<(), CollectorError> {
        self.bind()?.serve()
    }
}

/// Collector with a bound listener, ready to accept producers.
#[derive(Debug)]
pub struct ListeningCollector {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<CollectorConfig>,
}

/// Accept failures caused by a single peer rather than the listener itself.
fn is_recoverable_accept_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

impl ListeningCollector {
    /// Address actually bound, useful when the configured port was 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the accept loop. Returns only on a non-recoverable accept error.
    pub fn serve(self) -> Result<(), CollectorError> {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => self.spawn_session(stream, peer),
                Err(err) if is_recoverable_accept_error(&err) => {
                    warn!("log collector: accept failed: {err}");
                }
                Err(err) => return Err(CollectorError::Accept(err)),
            }
        }
    }

    fn spawn_session(&self, stream: TcpStream, peer: SocketAddr) {
        let config = Arc::clone(&self.config);
        let spawned = thread::Builder::new()
            .name(format!("log-session-{peer}"))
            .spawn(move || session::run_session(stream, peer, &config));
        if let Err(err) = spawned {
            warn!("log collector: could not start session for {peer}: {err}");
        }
    }
}
