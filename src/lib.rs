//! Remote log transport.
//!
//! Producers log through a [`RemoteLogger`], which mirrors every record to
//! stdout and ships it as one newline-terminated line over TCP. A
//! [`LogCollector`] accepts any number of producers and appends their lines
//! to a shared append-only file.

pub mod client;
pub mod clock;
pub mod collector;
pub mod config;
pub mod formatter;
pub mod level;
pub mod log_compat;
pub mod log_record;
pub mod protocol;
pub mod tee;

pub use client::{Connection, FramedLineWriter, LoggerBuilder, LoggerError, RemoteLogger};
pub use clock::{Clock, FixedClock, SystemClock};
pub use collector::{
    CollectorError, DisconnectReason, ListeningCollector, LogCollector, SessionEvent,
};
pub use config::{ClientConfig, CollectorConfig, ConfigError, LoadedConfig, load_ini};
pub use formatter::{DefaultFormatter, LineFormatter, SharedFormatter};
pub use level::LogLevel;
pub use log_record::LogRecord;
pub use tee::{Sink, TeeWriter};
