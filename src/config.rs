//! Configuration for the remote log client and the collector.
//!
//! Both sides start from defaults that mirror the wire protocol constants
//! and accept `with_*` overrides. [`load_ini`] reads the same settings from
//! an INI file with optional `[client]` and `[collector]` sections:
//!
//! ```ini
//! [client]
//! address = 10.0.0.5:8081
//! dial_timeout_ms = 2000
//! write_timeout_ms = 5000
//!
//! [collector]
//! address = 0.0.0.0:8081
//! log_path = /var/log/app.log
//! idle_timeout_secs = 86400
//! file_mode = 0640
//! flush_interval = 1
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crossbeam_channel::Sender;
use ini::Ini;
use thiserror::Error;

use crate::{
    collector::SessionEvent,
    protocol::{
        DEFAULT_ADDR, DEFAULT_DIAL_TIMEOUT, DEFAULT_FILE_MODE, DEFAULT_IDLE_TIMEOUT,
        DEFAULT_LOG_FILE, DEFAULT_WRITE_TIMEOUT,
    },
};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },
    #[error("unknown section [{0}]")]
    UnknownSection(String),
    #[error("unknown key {key} in [{section}]")]
    UnknownKey { section: String, key: String },
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Settings used by [`RemoteLogger`](crate::RemoteLogger) to reach the collector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host:port` of the collector.
    pub addr: String,
    /// Bound on establishing the connection.
    pub dial_timeout: Duration,
    /// Socket write timeout; `None` leaves writes unbounded.
    pub write_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.into(),
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            write_timeout: Some(DEFAULT_WRITE_TIMEOUT),
        }
    }
}

impl ClientConfig {
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Reject values the socket layer cannot honour.
    pub fn validate(&self) -> Result<(), String> {
        if self.addr.trim().is_empty() {
            return Err("collector address must not be empty".into());
        }
        if self.dial_timeout.is_zero() {
            return Err("dial timeout must be greater than zero".into());
        }
        if self.write_timeout.is_some_and(|t| t.is_zero()) {
            return Err("write timeout must be greater than zero".into());
        }
        Ok(())
    }
}

/// Settings for [`LogCollector`](crate::LogCollector).
#[derive(Clone, Debug)]
pub struct CollectorConfig {
    /// Address to bind, e.g. `127.0.0.1:8081` or `127.0.0.1:0`.
    pub addr: String,
    /// File every session appends to.
    pub log_path: PathBuf,
    /// Absolute per-session deadline measured from accept.
    pub idle_timeout: Duration,
    /// Permission bits applied when the log file is created (Unix only).
    pub file_mode: u32,
    /// Flush the session's file buffer every N records; 0 defers flushing
    /// to buffer pressure and session close.
    pub flush_interval: usize,
    /// Optional observer for connect and disconnect events.
    pub events: Option<Sender<SessionEvent>>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.into(),
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            file_mode: DEFAULT_FILE_MODE,
            flush_interval: 1,
            events: None,
        }
    }
}

impl PartialEq for CollectorConfig {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
            && self.log_path == other.log_path
            && self.idle_timeout == other.idle_timeout
            && self.file_mode == other.file_mode
            && self.flush_interval == other.flush_interval
            && self.events.is_some() == other.events.is_some()
    }
}

impl CollectorConfig {
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    pub fn with_flush_interval(mut self, interval: usize) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Deliver [`SessionEvent`]s to `events`. Use an unbounded channel;
    /// events that do not fit are discarded.
    pub fn with_events(mut self, events: Sender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.addr.trim().is_empty() {
            return Err("listen address must not be empty".into());
        }
        if self.idle_timeout.is_zero() {
            return Err("idle timeout must be greater than zero".into());
        }
        if self.file_mode > 0o7777 {
            return Err(format!("file mode {:o} is out of range", self.file_mode));
        }
        Ok(())
    }
}

/// Settings read from a configuration file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedConfig {
    pub client: ClientConfig,
    pub collector: CollectorConfig,
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
        reason: reason.into(),
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(key, value, "expected a non-negative integer"))
}

fn parse_millis(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let ms = parse_u64(key, value)?;
    if ms == 0 {
        return Err(invalid(key, value, "must be greater than zero"));
    }
    Ok(Duration::from_millis(ms))
}

fn parse_mode(key: &str, value: &str) -> Result<u32, ConfigError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0o")
        .or_else(|| trimmed.strip_prefix("0O"))
        .unwrap_or(trimmed);
    let mode =
        u32::from_str_radix(digits, 8).map_err(|_| invalid(key, value, "expected an octal mode"))?;
    if mode > 0o7777 {
        return Err(invalid(key, value, "mode out of range"));
    }
    Ok(mode)
}

fn apply_client(config: &mut ClientConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "address" => config.addr = value.trim().to_owned(),
        "dial_timeout_ms" => config.dial_timeout = parse_millis(key, value)?,
        "write_timeout_ms" => config.write_timeout = Some(parse_millis(key, value)?),
        _ => {
            return Err(ConfigError::UnknownKey {
                section: "client".into(),
                key: key.to_owned(),
            });
        }
    }
    Ok(())
}

fn apply_collector(
    config: &mut CollectorConfig,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match key {
        "address" => config.addr = value.trim().to_owned(),
        "log_path" => config.log_path = PathBuf::from(value.trim()),
        "idle_timeout_secs" => {
            let secs = parse_u64(key, value)?;
            if secs == 0 {
                return Err(invalid(key, value, "must be greater than zero"));
            }
            config.idle_timeout = Duration::from_secs(secs);
        }
        "file_mode" => config.file_mode = parse_mode(key, value)?,
        "flush_interval" => {
            config.flush_interval = usize::try_from(parse_u64(key, value)?)
                .map_err(|_| invalid(key, value, "out of range"))?;
        }
        _ => {
            return Err(ConfigError::UnknownKey {
                section: "collector".into(),
                key: key.to_owned(),
            });
        }
    }
    Ok(())
}

/// Build a [`LoadedConfig`] from INI text.
pub fn parse_ini(text: &str) -> Result<LoadedConfig, ConfigError> {
    let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Load {
        path: PathBuf::from("<string>"),
        source: ini::Error::Parse(err),
    })?;
    from_ini(&ini)
}

/// Read a [`LoadedConfig`] from the INI file at `path`.
pub fn load_ini(path: impl AsRef<Path>) -> Result<LoadedConfig, ConfigError> {
    let path = path.as_ref();
    let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    from_ini(&ini)
}

fn from_ini(ini: &Ini) -> Result<LoadedConfig, ConfigError> {
    let mut loaded = LoadedConfig::default();
    for (section, props) in ini.iter() {
        match section {
            Some("client") => {
                for (key, value) in props.iter() {
                    apply_client(&mut loaded.client, key, value)?;
                }
            }
            Some("collector") => {
                for (key, value) in props.iter() {
                    apply_collector(&mut loaded.collector, key, value)?;
                }
            }
            Some(other) => return Err(ConfigError::UnknownSection(other.to_owned())),
            None => {
                if let Some((key, _)) = props.iter().next() {
                    return Err(ConfigError::UnknownKey {
                        section: "general".into(),
                        key: key.to_owned(),
                    });
                }
            }
        }
    }
    Ok(loaded)
}
