//! Log record representation.
//!
//! A `LogRecord` captures a level, the UTC instant it was created, and the
//! already formatted message text. Records are immutable once built and are
//! never parsed back by the client.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::{level::LogLevel, protocol::TIMESTAMP_FORMAT};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity tag.
    pub level: LogLevel,
    /// Creation time, rendered with second precision.
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied message after argument substitution.
    pub message: String,
}

impl LogRecord {
    /// Construct a record from pre-rendered message text.
    pub fn new(level: LogLevel, timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp,
            message: message.into(),
        }
    }

    /// Construct a record by rendering `args` into the message.
    pub fn from_args(level: LogLevel, timestamp: DateTime<Utc>, args: fmt::Arguments<'_>) -> Self {
        let message = match args.as_str() {
            Some(literal) => literal.to_owned(),
            None => args.to_string(),
        };
        Self::new(level, timestamp, message)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}",
            self.level,
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.message
        )
    }
}
